//! 一次性命令：list / record
//!
//! Results are written to `out` as pretty JSON; logs go to stderr.

use std::io::Write;

use anyhow::{Context, Result};
use privatezone_core::{Reconciler, RecordStore};
use privatezone_provider::NewRecord;
use serde::Serialize;

use crate::config::RecordCommand;

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to write output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}

/// `list`: the endpoints external-dns would see for the configured VPC.
pub async fn list(reconciler: &Reconciler, out: &mut impl Write) -> Result<()> {
    let endpoints = reconciler.records().await?;
    log::info!("Found {} endpoints", endpoints.len());
    print_json(out, &endpoints)
}

/// `record add|delete|list`
pub async fn record(store: &RecordStore, command: RecordCommand, out: &mut impl Write) -> Result<()> {
    match command {
        RecordCommand::Add {
            zone,
            host,
            record_type,
            value,
            ttl,
        } => {
            let record = NewRecord::new(host, record_type.to_ascii_uppercase(), value, ttl);
            store.create_record(&zone.to_string(), &record).await?;
        }
        RecordCommand::Delete {
            zone,
            host,
            record_type,
            values,
        } => {
            store
                .delete_records(&zone.to_string(), &host, &record_type, &values)
                .await?;
        }
        RecordCommand::List { zone } => {
            let records = store.list_records(&zone.to_string()).await?;
            log::info!("Zone {zone} has {} records", records.len());
            print_json(out, &records)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use privatezone_core::ReconcilerOptions;
    use privatezone_core::test_utils::MockPrivateZoneApi;
    use privatezone_provider::ZoneRecord;

    use super::*;

    fn store(api: &Arc<MockPrivateZoneApi>) -> RecordStore {
        RecordStore::new(api.clone(), 100, 100)
    }

    #[tokio::test]
    async fn list_prints_vpc_endpoints() {
        let api = Arc::new(MockPrivateZoneApi::new());
        api.add_zone(Some("vpc-1"), 123, "example.com").await;
        api.add_zone(Some("vpc-2"), 456, "other.example").await;
        api.add_record(123, "www", "A", "1.1.1.1", Some(300)).await;
        api.add_record(456, "db", "A", "10.0.0.1", None).await;
        let reconciler = Reconciler::new(
            api,
            ReconcilerOptions {
                vpc_id: Some("vpc-1".to_string()),
                ..ReconcilerOptions::default()
            },
        )
        .unwrap();

        let mut out = Vec::new();
        list(&reconciler, &mut out).await.unwrap();
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed.as_array().unwrap().len(), 1);
        assert_eq!(printed[0]["dnsName"], "www.example.com");
        assert_eq!(printed[0]["targets"][0], "1.1.1.1");
    }

    #[tokio::test]
    async fn record_add_creates_one_record() {
        let api = Arc::new(MockPrivateZoneApi::new());
        api.add_zone(None, 42, "example.com").await;

        let mut out = Vec::new();
        record(
            &store(&api),
            RecordCommand::Add {
                zone: 42,
                host: "www".to_string(),
                record_type: "a".to_string(),
                value: "10.0.0.1".to_string(),
                ttl: Some(60),
            },
            &mut out,
        )
        .await
        .unwrap();

        let records = api.records(42).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, "A");
        assert_eq!(records[0].ttl, Some(60));
        assert_eq!(api.count_calls("create_record").await, 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn record_delete_removes_only_matching_values() {
        let api = Arc::new(MockPrivateZoneApi::new());
        api.add_zone(None, 42, "example.com").await;
        api.add_record(42, "www", "A", "10.0.0.1", None).await;
        api.add_record(42, "www", "A", "10.0.0.2", None).await;
        api.add_record(42, "api", "A", "10.0.0.1", None).await;

        record(
            &store(&api),
            RecordCommand::Delete {
                zone: 42,
                host: "www".to_string(),
                record_type: "A".to_string(),
                values: vec!["10.0.0.1".to_string()],
            },
            &mut Vec::new(),
        )
        .await
        .unwrap();

        let left: Vec<(String, String)> = api
            .records(42)
            .await
            .into_iter()
            .map(|r| (r.host, r.value))
            .collect();
        assert_eq!(
            left,
            vec![
                ("www".to_string(), "10.0.0.2".to_string()),
                ("api".to_string(), "10.0.0.1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn record_list_prints_zone_records() {
        let api = Arc::new(MockPrivateZoneApi::new());
        api.add_zone(None, 42, "example.com").await;
        api.add_record(42, "www", "A", "10.0.0.1", Some(300)).await;
        api.add_record(42, "@", "TXT", "\"hello\"", None).await;

        let mut out = Vec::new();
        record(&store(&api), RecordCommand::List { zone: 42 }, &mut out)
            .await
            .unwrap();

        let printed: Vec<ZoneRecord> = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed.len(), 2);
        assert_eq!(printed[0].host, "www");
        assert_eq!(printed[1].record_type, "TXT");
    }

    #[tokio::test]
    async fn unknown_zone_is_an_error() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let result = record(&store(&api), RecordCommand::List { zone: 7 }, &mut Vec::new()).await;
        assert!(result.is_err());
    }
}
