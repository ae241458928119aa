//! Decoding of registry attestation bundles into typed claims
//!
//! Signatures are carried through untouched; nothing here verifies them.

use std::collections::BTreeMap;

use base64::Engine as _;
use crumbs_errors::AttestationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SLSA_PROVENANCE_V02: &str = "https://slsa.dev/provenance/v0.2";
pub const SLSA_PROVENANCE_V1: &str = "https://slsa.dev/provenance/v1";
pub const NPM_PUBLISH_V01: &str = "https://github.com/npm/attestation/tree/main/specs/publish/v0.1";
pub const IN_TOTO_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Response body of the registry attestations endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationBundles {
    pub attestations: Vec<RawAttestation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttestation {
    pub predicate_type: String,
    pub bundle: Bundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub verification_material: Option<Value>,
    pub dsse_envelope: DsseEnvelope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEnvelope {
    /// Base64 encoded in-toto statement
    pub payload: String,
    pub payload_type: String,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub sig: String,
    #[serde(default)]
    pub keyid: String,
}

/// In-toto statement carried by an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    #[serde(rename = "_type", default)]
    pub statement_type: String,
    #[serde(default)]
    pub subject: Vec<Subject>,
    pub predicate_type: String,
    #[serde(default)]
    pub predicate: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub digest: BTreeMap<String, String>,
}

/// Source revision a build claims to have consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceClaim {
    pub uri: Option<String>,
    pub commit: String,
}

/// A decoded attestation, discriminated by predicate type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attestation {
    /// SLSA build provenance
    Provenance {
        statement: Statement,
        source: Option<SourceClaim>,
    },
    /// npm publish attestation
    Publish {
        statement: Statement,
        name: Option<String>,
        version: Option<String>,
    },
    Other {
        statement: Statement,
    },
}

impl Attestation {
    #[must_use]
    pub fn statement(&self) -> &Statement {
        match self {
            Self::Provenance { statement, .. }
            | Self::Publish { statement, .. }
            | Self::Other { statement } => statement,
        }
    }

    /// Commit recorded by a provenance claim
    #[must_use]
    pub fn source_commit(&self) -> Option<&str> {
        match self {
            Self::Provenance {
                source: Some(source),
                ..
            } => Some(&source.commit),
            _ => None,
        }
    }
}

/// Short name under which a predicate type is reported
#[must_use]
pub fn predicate_alias(predicate_type: &str) -> &str {
    match predicate_type {
        SLSA_PROVENANCE_V02 | SLSA_PROVENANCE_V1 => "provenance",
        NPM_PUBLISH_V01 => "publish",
        other => other,
    }
}

/// Decoded attestations keyed by predicate alias
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attestations(BTreeMap<String, Attestation>);

impl Attestations {
    /// Decode every bundle.
    ///
    /// # Errors
    /// Fails on a payload that is not base64, not an in-toto statement, or
    /// of an unexpected payload type, and when two bundles share an alias.
    pub fn decode(bundles: &AttestationBundles) -> Result<Self, AttestationError> {
        let mut decoded = BTreeMap::new();
        for raw in &bundles.attestations {
            let alias = predicate_alias(&raw.predicate_type).to_string();
            let attestation = decode_attestation(raw)?;
            if decoded.insert(alias.clone(), attestation).is_some() {
                return Err(AttestationError::Duplicate { alias });
            }
        }
        Ok(Self(decoded))
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&Attestation> {
        self.0.get(alias)
    }

    #[must_use]
    pub fn provenance(&self) -> Option<&Attestation> {
        self.get("provenance")
    }

    #[must_use]
    pub fn publish(&self) -> Option<&Attestation> {
        self.get("publish")
    }

    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode a single bundle into its typed claim.
///
/// # Errors
/// See [`Attestations::decode`].
pub fn decode_attestation(raw: &RawAttestation) -> Result<Attestation, AttestationError> {
    let envelope = &raw.bundle.dsse_envelope;
    if envelope.payload_type != IN_TOTO_PAYLOAD_TYPE {
        return Err(AttestationError::UnexpectedPayloadType {
            payload_type: envelope.payload_type.clone(),
        });
    }

    let bytes = base64::engine::general_purpose::STANDARD.decode(envelope.payload.trim())?;
    let statement: Statement =
        serde_json::from_slice(&bytes).map_err(|e| AttestationError::InvalidStatement {
            message: e.to_string(),
        })?;

    Ok(match statement.predicate_type.as_str() {
        SLSA_PROVENANCE_V02 => {
            let source = v02_source(&statement.predicate);
            Attestation::Provenance { statement, source }
        }
        SLSA_PROVENANCE_V1 => {
            let source = v1_source(&statement.predicate);
            Attestation::Provenance { statement, source }
        }
        NPM_PUBLISH_V01 => {
            let field = |key: &str| {
                statement
                    .predicate
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            let (name, version) = (field("name"), field("version"));
            Attestation::Publish {
                statement,
                name,
                version,
            }
        }
        _ => Attestation::Other { statement },
    })
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct V02Predicate {
    #[serde(default)]
    invocation: V02Invocation,
    #[serde(default)]
    materials: Vec<ResourceDescriptor>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct V02Invocation {
    #[serde(default)]
    config_source: Option<ResourceDescriptor>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct V1Predicate {
    #[serde(default)]
    build_definition: V1BuildDefinition,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct V1BuildDefinition {
    #[serde(default)]
    resolved_dependencies: Vec<ResourceDescriptor>,
}

#[derive(Deserialize, Default)]
struct ResourceDescriptor {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    digest: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    fn claim(self, algorithm: &str) -> Option<SourceClaim> {
        let commit = self.digest.get(algorithm)?.clone();
        Some(SourceClaim {
            uri: self.uri,
            commit,
        })
    }
}

fn v02_source(predicate: &Value) -> Option<SourceClaim> {
    let predicate = V02Predicate::deserialize(predicate).ok()?;
    predicate
        .invocation
        .config_source
        .and_then(|source| source.claim("sha1"))
        .or_else(|| {
            predicate
                .materials
                .into_iter()
                .find_map(|material| material.claim("sha1"))
        })
}

fn v1_source(predicate: &Value) -> Option<SourceClaim> {
    V1Predicate::deserialize(predicate)
        .ok()?
        .build_definition
        .resolved_dependencies
        .into_iter()
        .find_map(|dependency| dependency.claim("gitCommit"))
}
