//! Static reference data: maps (with their sites) and the attacker/defender rosters.

use crate::models::round::Side;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Errors raised while loading catalog data.
#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
    /// A section (maps, attackers, defenders, generic sites) is empty.
    EmptySection(&'static str),
    /// An operator is listed both as attacker and defender.
    OverlappingOperator(String),
    /// A map has no sites to defend.
    MapWithoutSites(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog is not valid JSON: {}", e),
            CatalogError::EmptySection(section) => write!(f, "Catalog section '{}' is empty", section),
            CatalogError::OverlappingOperator(op) => {
                write!(f, "Operator {} is listed as both attacker and defender", op)
            }
            CatalogError::MapWithoutSites(map) => write!(f, "Map {} has no sites", map),
        }
    }
}

impl std::error::Error for CatalogError {}

/// A playable map and its defensive sites.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub name: String,
    pub sites: Vec<String>,
}

/// Read-only catalog shared by every match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub maps: Vec<MapEntry>,
    /// Sites offered for defense rounds while no map is set.
    pub generic_sites: Vec<String>,
    pub attackers: Vec<String>,
    pub defenders: Vec<String>,
}

impl Catalog {
    /// The catalog compiled into the binary. Panics on first use if the embedded data is corrupt.
    pub fn builtin() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| match Catalog::from_json(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => panic!("built-in catalog is invalid: {}", e),
        })
    }

    /// Parse and validate catalog data.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.maps.is_empty() {
            return Err(CatalogError::EmptySection("maps"));
        }
        if self.generic_sites.is_empty() {
            return Err(CatalogError::EmptySection("generic_sites"));
        }
        if self.attackers.is_empty() {
            return Err(CatalogError::EmptySection("attackers"));
        }
        if self.defenders.is_empty() {
            return Err(CatalogError::EmptySection("defenders"));
        }
        if let Some(map) = self.maps.iter().find(|m| m.sites.is_empty()) {
            return Err(CatalogError::MapWithoutSites(map.name.clone()));
        }
        let attackers: HashSet<_> = self.attackers.iter().collect();
        if let Some(op) = self.defenders.iter().find(|op| attackers.contains(op)) {
            return Err(CatalogError::OverlappingOperator(op.clone()));
        }
        Ok(())
    }

    pub fn map_names(&self) -> Vec<String> {
        self.maps.iter().map(|m| m.name.clone()).collect()
    }

    pub fn map(&self, name: &str) -> Option<&MapEntry> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// Operators available to one side.
    pub fn operators(&self, side: Side) -> &[String] {
        match side {
            Side::Attack => &self.attackers,
            Side::Defense => &self.defenders,
        }
    }

    /// Attackers followed by defenders.
    pub fn all_operators(&self) -> Vec<String> {
        self.attackers
            .iter()
            .chain(self.defenders.iter())
            .cloned()
            .collect()
    }

    /// Sites a defense round can be played on: the map's own, or the generic list when unknown.
    pub fn sites_for(&self, map: Option<&str>) -> &[String] {
        map.and_then(|name| self.map(name))
            .map(|m| m.sites.as_slice())
            .unwrap_or(&self.generic_sites)
    }
}
