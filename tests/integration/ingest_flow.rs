//! Integration tests for the ingestion pipeline over the in-memory store.

mod helpers;

use chrono::Duration;

use jobfeed_core::error::ErrorKind;
use jobfeed_database::CompanyStore;
use jobfeed_ingest::{ExpiryReaper, IngestSource, UploadResponse};

use helpers::{TestEnv, batch_time};

#[tokio::test]
async fn test_single_row_scenario() {
    let env = TestEnv::new(r#"{"C5": "Berlin"}"#, batch_time());
    let path = env.write_file(
        "upload-0001",
        "title,company_name,location,requirements,job_apply_url\n\
         Engineer,Acme,C5,Python required,https://acme.com/jobs/eng?utm_source=indeed&x=1\n",
    );

    let response = env.pipeline.handle_upload(&path, ".csv").await;
    assert!(matches!(
        response,
        UploadResponse::Success {
            inserted_count: 1,
            ..
        }
    ));

    let jobs = env.store.all_jobs().await;
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.title, "Engineer");
    assert_eq!(job.company_name, "Acme");
    assert_eq!(job.location, "Berlin");
    assert_eq!(job.skills.as_deref(), Some("Python"));
    assert_eq!(job.salary_range.as_deref(), Some("Negotiable"));
    assert_eq!(job.job_apply_url, "https://acme.com/jobs/eng?x=1");
    assert_eq!(job.created_at, batch_time());
    assert_eq!(job.expires_at, batch_time() + Duration::days(60));

    let companies = env.store.list().await.unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].company_name, "Acme");
    assert_eq!(companies[0].career_url.as_deref(), Some("https://acme.com/jobs"));
    assert_eq!(companies[0].created_at, batch_time());

    assert!(!path.exists());
    assert!(env.archived("upload-0001_20260601_210000.csv").exists());
}

#[tokio::test]
async fn test_spreadsheet_export_with_aliases() {
    let env = TestEnv::new(r#"{"C12": "Shanghai"}"#, batch_time());
    let path = env.write_xlsx(
        "2026-06-01.xlsx",
        &[
            &["Title", "Company", "Location", "Requirements", "ApplyURL", "IsRemote"],
            &[
                "Frontend Engineer",
                "Globex",
                "Remote - C12",
                "Must know JavaScript, React and Node.js",
                "https://globex.net/apply?id=7&utm_source=board&ref=x",
                "yes",
            ],
            &["", "", "", "", "", ""],
        ],
    );

    let outcome = env
        .pipeline
        .ingest(&IngestSource::drop_file(&path).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome.inserted_count, 1);
    let job = &env.store.all_jobs().await[0];
    assert_eq!(job.location, "Shanghai");
    assert_eq!(job.skills.as_deref(), Some("JavaScript, React, Node.js"));
    assert_eq!(job.job_apply_url, "https://globex.net/apply?id=7");
    assert!(job.is_remote);

    let company = env.store.find_by_name("Globex").await.unwrap().unwrap();
    assert_eq!(company.career_url.as_deref(), Some("https://globex.net"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_company_dedup_across_rows_and_batches() {
    let env = TestEnv::new("{}", batch_time());
    let first = env.write_file(
        "first.csv",
        "company_name,job_apply_url\n\
         Acme,https://acme.com/career/eng\n\
         Initech,https://initech.io/apply\n\
         Acme,https://acme.com/jobs/qa\n",
    );
    env.pipeline.handle_upload(&first, "csv").await;

    env.clock.advance(Duration::days(1));
    let second = env.write_file(
        "second.csv",
        "company_name,job_apply_url\nAcme,https://elsewhere.com/x\n",
    );
    let response = env.pipeline.handle_upload(&second, "csv").await;
    assert!(matches!(response, UploadResponse::Success { .. }));

    let companies = env.store.list().await.unwrap();
    assert_eq!(companies.len(), 2);
    let acme = env.store.find_by_name("Acme").await.unwrap().unwrap();
    assert_eq!(acme.career_url.as_deref(), Some("https://acme.com/career"));
    assert_eq!(env.store.all_jobs().await.len(), 4);
}

#[tokio::test]
async fn test_constraint_violation_rejects_whole_batch() {
    let env = TestEnv::new("{}", batch_time());
    let long_title = "T".repeat(300);
    let path = env.write_file(
        "upload-0002",
        &format!(
            "title,company_name,job_apply_url\n\
             Engineer,Acme,https://acme.com/jobs/1\n\
             {long_title},Globex,https://globex.com/jobs/2\n"
        ),
    );

    let response = env.pipeline.handle_upload(&path, "csv").await;

    let UploadResponse::Failure(payload) = response else {
        panic!("expected a failure payload");
    };
    assert_eq!(payload.error, ErrorKind::Persistence.to_string());
    assert!(payload.details.contains("Record 2"));
    assert!(env.store.all_jobs().await.is_empty());
    assert!(env.store.list().await.unwrap().is_empty());
    assert!(!path.exists());
    assert!(!env.dir.path().join("archive").exists());
}

#[tokio::test]
async fn test_corrupt_spreadsheet_is_io_failure() {
    let env = TestEnv::new("{}", batch_time());
    let path = env.write_file("upload-0003", "not a workbook");

    let response = env.pipeline.handle_upload(&path, "xlsx").await;

    let UploadResponse::Failure(payload) = response else {
        panic!("expected a failure payload");
    };
    assert_eq!(payload.error, ErrorKind::Io.to_string());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_reaper_after_validity_window() {
    let env = TestEnv::new("{}", batch_time());
    let path = env.write_file(
        "upload-0004",
        "title,job_apply_url\nA,https://a.com/jobs/1\nB,https://b.com/jobs/2\n",
    );
    env.pipeline.handle_upload(&path, "csv").await;

    let reaper = ExpiryReaper::new(env.store.clone());
    let expiry = batch_time() + Duration::days(60);

    assert_eq!(reaper.purge_expired(expiry).await.unwrap(), 0);
    assert_eq!(
        reaper
            .purge_expired(expiry + Duration::seconds(1))
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        reaper
            .purge_expired(expiry + Duration::seconds(1))
            .await
            .unwrap(),
        0
    );
}
