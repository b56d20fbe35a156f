//! Static domain table compiled from org records.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::OrgRecord;
use crate::lookup::{DomainLookup, LookupError};
use crate::routing::tenant::TenantId;

/// Immutable custom domain → tenant map.
#[derive(Debug, Clone, Default)]
pub struct DomainTable {
    domains: HashMap<String, TenantId>,
}

impl DomainTable {
    /// Compile org records. Records without a domain are skipped.
    ///
    /// Domain uniqueness is enforced by config validation; records are
    /// expected to have passed it.
    pub fn from_records(records: &[OrgRecord]) -> Self {
        let domains = records
            .iter()
            .filter_map(|record| {
                let key = record.domain.as_deref()?.trim().to_lowercase();
                let tenant = TenantId::new(&record.username)?;
                (!key.is_empty()).then_some((key, tenant))
            })
            .collect();
        Self { domains }
    }

    pub fn get(&self, domain: &str) -> Option<&TenantId> {
        self.domains.get(&domain.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[async_trait]
impl DomainLookup for DomainTable {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantId>, LookupError> {
        Ok(self.get(domain).cloned())
    }
}
