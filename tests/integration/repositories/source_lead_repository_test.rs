// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::sqlite_db;
use chrono::Utc;
use leadrs::domain::models::lead::{EmailStatus, LeadCandidate, NewLead};
use leadrs::domain::models::source::{NewSource, SourceUpdate};
use leadrs::domain::repositories::{
    lead_repository::LeadRepository, source_repository::SourceRepository,
};
use leadrs::infrastructure::repositories::{
    lead_repo_impl::LeadRepositoryImpl, source_repo_impl::SourceRepositoryImpl,
};
use serde_json::json;

#[tokio::test]
async fn test_source_create_update_and_list() {
    let db = sqlite_db().await;
    let sources = SourceRepositoryImpl::new(db);

    let selectors = json!({
        "containerSelector": ".card",
        "fieldSelectors": { "companyName": ".name" }
    });
    let mut new_source = NewSource::new("Office moves", "https://offices.example.com", selectors.clone());
    new_source.auth_credential = Some("Bearer token".to_string());

    let created = sources.create(&new_source).await.unwrap();
    assert!(created.enabled);
    assert!(created.last_scraped.is_none());
    assert_eq!(created.selectors, selectors);
    assert_eq!(created.auth_credential.as_deref(), Some("Bearer token"));
    assert!(created.selector_config().is_ok());

    let now = Utc::now();
    let updated = sources
        .update(created.id, &SourceUpdate::last_scraped(now))
        .await
        .unwrap()
        .unwrap();
    assert!(updated.last_scraped.is_some());
    assert_eq!(updated.name, "Office moves");

    sources
        .create(&NewSource::new("Second", "https://second.example.com", json!(null)))
        .await
        .unwrap();
    let all = sources.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, created.id);

    assert!(sources
        .update(999, &SourceUpdate::last_scraped(now))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_leads_are_listed_by_source_url_in_order() {
    let db = sqlite_db().await;
    let leads = LeadRepositoryImpl::new(db);
    let now = Utc::now();

    let lead = |name: &str, email: Option<&str>| {
        let data = LeadCandidate {
            company_name: Some(name.to_string()),
            city: Some("Springfield".to_string()),
            contact_email: email.map(str::to_string),
            employee_count: Some(120),
            ..Default::default()
        }
        .finish(now)
        .unwrap();
        NewLead::from_scraped(data, "https://offices.example.com")
    };

    let first = leads.create(&lead("Acme", Some("ops@acme.test"))).await.unwrap();
    leads.create(&lead("Globex", None)).await.unwrap();
    leads
        .create(&NewLead::from_scraped(
            lead("Elsewhere", None).data,
            "https://other.example.com",
        ))
        .await
        .unwrap();

    assert_eq!(first.email_status, EmailStatus::Pending);
    assert_eq!(first.data.employee_count, Some(120));

    let found = leads
        .find_by_source_url("https://offices.example.com")
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].data.company_name, "Acme");
    assert_eq!(found[1].data.company_name, "Globex");
    assert_eq!(found[1].email_status, EmailStatus::Failed);
    assert_eq!(found[0].data.city.as_deref(), Some("Springfield"));
}
