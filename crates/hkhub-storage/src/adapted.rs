// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use hkhub_app::{Client, ClientBook, HousekeepingDetails};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::{BOOK_VERSION, StorageError};

/// JSON form of [`HousekeepingDetails`]: a bare string in storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonAdaptedDetails {
    details: String,
}

impl JsonAdaptedDetails {
    pub fn from_persisted(raw: impl Into<String>) -> Self {
        Self {
            details: raw.into(),
        }
    }

    pub fn from_model(source: &HousekeepingDetails) -> Self {
        Self {
            details: source.to_string(),
        }
    }

    pub fn serialized_value(&self) -> &str {
        &self.details
    }

    pub fn to_model_type(&self) -> Result<HousekeepingDetails, StorageError> {
        HousekeepingDetails::parse_storage(&self.details).map_err(|error| {
            warn!(value = %self.details, "rejecting stored housekeeping details");
            StorageError::IllegalValue(error.constraints().to_owned())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonAdaptedClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonAdaptedDetails>,
}

impl JsonAdaptedClient {
    pub fn from_model(source: &Client) -> Self {
        Self {
            name: source.name.clone(),
            details: source.details.as_ref().map(JsonAdaptedDetails::from_model),
        }
    }

    pub fn to_model_type(&self) -> Result<Client, StorageError> {
        if self.name.trim().is_empty() {
            return Err(StorageError::IllegalValue(
                "client name must not be blank".to_owned(),
            ));
        }
        let details = self
            .details
            .as_ref()
            .map(JsonAdaptedDetails::to_model_type)
            .transpose()?;
        Ok(Client::new(&self.name, details))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSerializableClientBook {
    pub version: i64,
    #[serde(default)]
    pub clients: Vec<JsonAdaptedClient>,
}

impl JsonSerializableClientBook {
    pub fn from_model(source: &ClientBook) -> Self {
        Self {
            version: BOOK_VERSION,
            clients: source
                .clients()
                .iter()
                .map(JsonAdaptedClient::from_model)
                .collect(),
        }
    }

    pub fn to_model_type(&self) -> Result<ClientBook, StorageError> {
        if self.version != BOOK_VERSION {
            return Err(StorageError::IllegalValue(format!(
                "unsupported client book version {}; expected {BOOK_VERSION}",
                self.version
            )));
        }

        let mut seen = BTreeSet::new();
        let mut clients = Vec::with_capacity(self.clients.len());
        for adapted in &self.clients {
            let client = adapted.to_model_type()?;
            if !seen.insert(client.name.clone()) {
                return Err(StorageError::IllegalValue(
                    "client list contains duplicate client(s)".to_owned(),
                ));
            }
            clients.push(client);
        }

        ClientBook::from_clients(clients)
            .map_err(|error| StorageError::IllegalValue(error.to_string()))
    }
}
