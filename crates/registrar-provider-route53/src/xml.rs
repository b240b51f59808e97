//! Route 53 REST/XML wire types
//!
//! Only the elements the registrar reads or writes are modelled; anything
//! else in a response is ignored.

use registrar_core::{ChangeSet, Error, Result};
use serde::{Deserialize, Serialize};

/// Namespace of the 2013-04-01 API
pub const XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// --- ChangeResourceRecordSets request ---

#[derive(Debug, Serialize)]
#[serde(rename = "ChangeResourceRecordSetsRequest")]
struct ChangeRequest<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    #[serde(rename = "ChangeBatch")]
    change_batch: ChangeBatch<'a>,
}

#[derive(Debug, Serialize)]
struct ChangeBatch<'a> {
    #[serde(rename = "Changes")]
    changes: Changes<'a>,
}

#[derive(Debug, Serialize)]
struct Changes<'a> {
    #[serde(rename = "Change")]
    change: Vec<Change<'a>>,
}

#[derive(Debug, Serialize)]
struct Change<'a> {
    #[serde(rename = "Action")]
    action: &'a str,
    #[serde(rename = "ResourceRecordSet")]
    record_set: RecordSet<'a>,
}

#[derive(Debug, Serialize)]
struct RecordSet<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Type")]
    record_type: &'a str,
    #[serde(rename = "TTL")]
    ttl: u32,
    #[serde(rename = "ResourceRecords")]
    records: ResourceRecords<'a>,
}

#[derive(Debug, Serialize)]
struct ResourceRecords<'a> {
    #[serde(rename = "ResourceRecord")]
    record: Vec<ResourceRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct ResourceRecord<'a> {
    #[serde(rename = "Value")]
    value: &'a str,
}

/// Encode a change set as a `ChangeResourceRecordSetsRequest` document
pub fn change_request_body(change_set: &ChangeSet) -> Result<String> {
    let record = &change_set.record;
    let request = ChangeRequest {
        xmlns: XMLNS,
        change_batch: ChangeBatch {
            changes: Changes {
                change: vec![Change {
                    action: change_set.action.as_str(),
                    record_set: RecordSet {
                        name: &record.name,
                        record_type: record.record_type.as_str(),
                        ttl: record.ttl,
                        records: ResourceRecords {
                            record: record
                                .values
                                .iter()
                                .map(|value| ResourceRecord { value })
                                .collect(),
                        },
                    },
                }],
            },
        },
    };

    let body = quick_xml::se::to_string(&request)
        .map_err(|e| Error::xml(format!("Failed to encode change request: {}", e)))?;

    Ok(format!("{XML_DECLARATION}{body}"))
}

// --- ListHostedZonesByName response ---

#[derive(Debug, Deserialize)]
struct ListHostedZonesByNameResponse {
    #[serde(rename = "HostedZones", default)]
    hosted_zones: HostedZones,
}

#[derive(Debug, Default, Deserialize)]
struct HostedZones {
    #[serde(rename = "HostedZone", default)]
    hosted_zone: Vec<HostedZoneEntry>,
}

/// A hosted zone as listed by Route 53
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedZoneEntry {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Decode the zones out of a `ListHostedZonesByNameResponse`
pub fn parse_hosted_zones(body: &str) -> Result<Vec<HostedZoneEntry>> {
    let response: ListHostedZonesByNameResponse = quick_xml::de::from_str(body)
        .map_err(|e| Error::xml(format!("Failed to parse hosted zone listing: {}", e)))?;

    Ok(response.hosted_zones.hosted_zone)
}

// --- ChangeResourceRecordSets response ---

#[derive(Debug, Deserialize)]
struct ChangeResourceRecordSetsResponse {
    #[serde(rename = "ChangeInfo")]
    change_info: ChangeInfoEntry,
}

/// Receipt for a submitted change batch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeInfoEntry {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
}

/// Decode the `ChangeInfo` out of a `ChangeResourceRecordSetsResponse`
pub fn parse_change_info(body: &str) -> Result<ChangeInfoEntry> {
    let response: ChangeResourceRecordSetsResponse = quick_xml::de::from_str(body)
        .map_err(|e| Error::xml(format!("Failed to parse change response: {}", e)))?;

    Ok(response.change_info)
}

// --- Errors ---

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error")]
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

// Batch validation failures use their own document shape.
#[derive(Debug, Deserialize)]
struct InvalidChangeBatch {
    #[serde(rename = "Messages")]
    messages: Messages,
}

#[derive(Debug, Deserialize)]
struct Messages {
    #[serde(rename = "Message", default)]
    message: Vec<String>,
}

/// An API error as reported in a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Decode an error body, if it is one Route 53 documents
pub fn parse_error(body: &str) -> Option<ApiError> {
    if let Ok(response) = quick_xml::de::from_str::<ErrorResponse>(body) {
        return Some(ApiError {
            code: response.error.code,
            message: response.error.message,
        });
    }

    quick_xml::de::from_str::<InvalidChangeBatch>(body)
        .ok()
        .map(|batch| ApiError {
            code: "InvalidChangeBatch".to_string(),
            message: batch.messages.message.join("; "),
        })
}
