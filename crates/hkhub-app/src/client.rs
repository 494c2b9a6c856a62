// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use time::Date;

use crate::details::HousekeepingDetails;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    pub details: Option<HousekeepingDetails>,
}

impl Client {
    pub fn new(name: &str, details: Option<HousekeepingDetails>) -> Self {
        Self {
            name: name.trim().to_owned(),
            details,
        }
    }

    pub fn next_due_date(&self) -> Option<Date> {
        self.details.as_ref().map(HousekeepingDetails::next_due_date)
    }
}

/// Clients in insertion order, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientBook {
    clients: Vec<Client>,
}

impl ClientBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clients(clients: Vec<Client>) -> Result<Self> {
        let mut book = Self::new();
        for client in clients {
            book.add(client)?;
        }
        Ok(book)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Client> {
        let name = name.trim();
        self.clients.iter().find(|client| client.name == name)
    }

    pub fn add(&mut self, client: Client) -> Result<()> {
        if client.name.trim().is_empty() {
            bail!("client name must not be blank");
        }
        if self.get(&client.name).is_some() {
            bail!("client {:?} already exists", client.name);
        }
        self.clients.push(client);
        Ok(())
    }

    pub fn set_details(&mut self, name: &str, details: Option<HousekeepingDetails>) -> Result<()> {
        let client = self.get_mut(name)?;
        client.details = details;
        Ok(())
    }

    /// Restarts the client's interval from `date`.
    pub fn mark_serviced(&mut self, name: &str, date: Date) -> Result<HousekeepingDetails> {
        let client = self.get_mut(name)?;
        let details = client.details.as_ref().ok_or_else(|| {
            anyhow!(
                "client {:?} has no housekeeping details; set them before marking a service",
                client.name
            )
        })?;
        let updated = details.serviced_on(date);
        client.details = Some(updated);
        Ok(updated)
    }

    pub fn remove(&mut self, name: &str) -> Result<Client> {
        let name = name.trim();
        let index = self
            .clients
            .iter()
            .position(|client| client.name == name)
            .ok_or_else(|| anyhow!("no client named {name:?}"))?;
        Ok(self.clients.remove(index))
    }

    /// Clients ordered by next-due date. Equal dates keep insertion order and
    /// clients without details come last.
    pub fn by_next_due(&self) -> Vec<&Client> {
        let mut ordered = self.clients.iter().collect::<Vec<_>>();
        ordered.sort_by(|left, right| match (&left.details, &right.details) {
            (Some(left), Some(right)) => left.cmp_next_due(right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ordered
    }

    pub fn due_on_or_before(&self, date: Date) -> Vec<&Client> {
        self.by_next_due()
            .into_iter()
            .filter(|client| client.next_due_date().is_some_and(|due| due <= date))
            .collect()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Client> {
        let name = name.trim();
        self.clients
            .iter_mut()
            .find(|client| client.name == name)
            .ok_or_else(|| anyhow!("no client named {name:?}"))
    }
}
