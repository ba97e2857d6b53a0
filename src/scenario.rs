use crate::aircraft::{Aircraft, AircraftId, AircraftType, Families, Family};
use crate::airport::{Airport, Stations};
use crate::config::EngineConfig;
use crate::error::ScenarioError;
use crate::flight::Flight;
use crate::rule::{Rule, RuleEvaluator};
use crate::tat::{TatCatalog, TatTable};
use serde::Deserialize;
use std::path::Path;

/// Snapshot of everything one assignment run reads. Never mutated by the
/// engines.
pub struct Scenario {
    pub config: EngineConfig,
    pub stations: Stations,
    /// Sorted by registration.
    pub aircraft: Vec<Aircraft>,
    pub families: Families,
    pub tat: TatCatalog,
    pub rules: Vec<Rule>,
    pub flights: Vec<Flight>,
}

impl Scenario {
    pub fn new(config: EngineConfig, airports: Vec<Airport>, mut aircraft: Vec<Aircraft>, flights: Vec<Flight>) -> Scenario {
        aircraft.sort_by(|a, b| a.id.cmp(&b.id));
        let stations = Stations::new(airports, config.operator_home_country.clone());
        Scenario {
            config,
            stations,
            aircraft,
            families: Families::default(),
            tat: TatCatalog::default(),
            rules: vec![],
            flights,
        }
    }

    pub fn with_tat(mut self, tables: Vec<TatTable>) -> Self {
        self.tat = TatCatalog::new(tables);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_families(mut self, families: Vec<Family>) -> Self {
        self.families = Families::new(families);
        self
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ScenarioError> {
        #[derive(Deserialize)]
        struct RawData {
            #[serde(default)]
            config: EngineConfig,
            #[serde(default)]
            stations: Vec<Airport>,
            aircraft: Vec<Aircraft>,
            #[serde(default)]
            families: Vec<Family>,
            #[serde(default)]
            tat: Vec<TatTable>,
            #[serde(default)]
            rules: Vec<Rule>,
            legs: Vec<Flight>,
        }
        let raw: RawData = serde_json::from_str(data)?;

        Ok(Scenario::new(raw.config, raw.stations, raw.aircraft, raw.legs)
            .with_tat(raw.tat)
            .with_rules(raw.rules)
            .with_families(raw.families))
    }

    pub fn find_aircraft(&self, id: &AircraftId) -> Option<&Aircraft> {
        self.aircraft
            .binary_search_by(|a| a.id.cmp(id))
            .ok()
            .map(|i| &self.aircraft[i])
    }

    /// Tails whose type is one of `types`, by registration.
    pub fn aircraft_of_types(&self, types: &[AircraftType]) -> Vec<&Aircraft> {
        self.aircraft
            .iter()
            .filter(|a| types.contains(&a.aircraft_type))
            .collect()
    }

    pub fn tat_for(&self, aircraft_type: &AircraftType) -> TatTable {
        self.tat
            .table_or_flat(aircraft_type, self.config.fallback_tat_minutes)
    }

    pub fn rule_evaluator(&self) -> RuleEvaluator<'_> {
        RuleEvaluator::new(&self.rules, &self.stations, &self.families, &self.config)
    }
}
