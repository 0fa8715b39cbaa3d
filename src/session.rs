//! Roster session data model.
//!
//! This module provides:
//! - `RosterSession` — one upload's worth of classified roster state
//! - `RosterMember` — a single roster row, serialized under the backend's
//!   upper-case column names
//! - `Category` — the five fixed classification buckets, in the load-bearing
//!   scan order used by all downstream derivation
//! - `Cycle` — the closed set of promotion cycles
//! - Fallback snapshot reconstruction for when the preview collaborator is
//!   unavailable

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Promotion cycle grades, serialized as their short codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cycle {
    Sra,
    Ssg,
    Tsg,
    Msg,
    Sms,
    Cms,
}

impl Cycle {
    /// Every cycle, in grade order.
    pub const ALL: [Cycle; 6] = [
        Cycle::Sra,
        Cycle::Ssg,
        Cycle::Tsg,
        Cycle::Msg,
        Cycle::Sms,
        Cycle::Cms,
    ];

    /// Short code used on the wire (e.g. "SSG").
    pub fn code(&self) -> &'static str {
        match self {
            Cycle::Sra => "SRA",
            Cycle::Ssg => "SSG",
            Cycle::Tsg => "TSG",
            Cycle::Msg => "MSG",
            Cycle::Sms => "SMS",
            Cycle::Cms => "CMS",
        }
    }

    /// Human-readable label for selection UIs.
    pub fn label(&self) -> &'static str {
        match self {
            Cycle::Sra => "Senior Airman (SRA)",
            Cycle::Ssg => "Staff Sergeant (SSG)",
            Cycle::Tsg => "Technical Sergeant (TSG)",
            Cycle::Msg => "Master Sergeant (MSG)",
            Cycle::Sms => "Senior Master Sergeant (SMS)",
            Cycle::Cms => "Chief Master Sergeant (CMS)",
        }
    }

    /// Cycles at or above MSG require a senior rater for every unit.
    pub fn always_needs_senior_rater(&self) -> bool {
        matches!(self, Cycle::Msg | Cycle::Sms)
    }
}

impl Default for Cycle {
    fn default() -> Self {
        Cycle::Ssg
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Cycle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SRA" => Ok(Cycle::Sra),
            "SSG" => Ok(Cycle::Ssg),
            "TSG" => Ok(Cycle::Tsg),
            "MSG" => Ok(Cycle::Msg),
            "SMS" => Ok(Cycle::Sms),
            "CMS" => Ok(Cycle::Cms),
            other => Err(anyhow::anyhow!("unknown promotion cycle: {other}")),
        }
    }
}

/// The fixed classification buckets.
///
/// `ALL` defines the scan order (`eligible, ineligible, discrepancy, btz,
/// small_unit`) that every first-seen tie-break downstream depends on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Eligible,
    Ineligible,
    Discrepancy,
    Btz,
    SmallUnit,
}

impl Category {
    /// Scan order for all cross-category derivation. Load-bearing.
    pub const ALL: [Category; 5] = [
        Category::Eligible,
        Category::Ineligible,
        Category::Discrepancy,
        Category::Btz,
        Category::SmallUnit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Eligible => "eligible",
            Category::Ineligible => "ineligible",
            Category::Discrepancy => "discrepancy",
            Category::Btz => "btz",
            Category::SmallUnit => "small_unit",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single roster row.
///
/// Field names follow the backend's roster column names on the wire; absent
/// columns deserialize as empty strings or `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RosterMember {
    pub member_id: String,
    #[serde(rename = "FULL_NAME", default)]
    pub full_name: String,
    #[serde(rename = "GRADE", default)]
    pub grade: String,
    #[serde(rename = "ASSIGNED_PAS", default)]
    pub assigned_pas: String,
    #[serde(rename = "ASSIGNED_PAS_CLEARTEXT", default)]
    pub assigned_pas_cleartext: String,
    #[serde(rename = "DAFSC", default, skip_serializing_if = "Option::is_none")]
    pub dafsc: Option<String>,
    #[serde(rename = "PAFSC", default)]
    pub pafsc: String,
    #[serde(rename = "DOR", default)]
    pub dor: String,
    #[serde(rename = "TAFMSD", default)]
    pub tafmsd: String,
    #[serde(
        rename = "DATE_ARRIVED_STATION",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_arrived_station: Option<String>,
    #[serde(
        rename = "REENL_ELIG_STATUS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reenl_elig_status: Option<String>,
    #[serde(rename = "UIF_CODE", default, skip_serializing_if = "Option::is_none")]
    pub uif_code: Option<u32>,
    #[serde(
        rename = "UIF_DISPOSITION_DATE",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub uif_disposition_date: Option<String>,
    #[serde(
        rename = "GRADE_PERM_PROJ",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grade_perm_proj: Option<String>,
    #[serde(rename = "2AFSC", default, skip_serializing_if = "Option::is_none")]
    pub afsc2: Option<String>,
    #[serde(rename = "3AFSC", default, skip_serializing_if = "Option::is_none")]
    pub afsc3: Option<String>,
    #[serde(rename = "4AFSC", default, skip_serializing_if = "Option::is_none")]
    pub afsc4: Option<String>,
    /// Why this member landed outside the eligible bucket, if known.
    #[serde(rename = "REASON", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl RosterMember {
    /// Create a member with the fields the derivation layer reads.
    pub fn new(member_id: &str, full_name: &str, assigned_pas: &str, cleartext: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            full_name: full_name.to_string(),
            assigned_pas: assigned_pas.to_string(),
            assigned_pas_cleartext: cleartext.to_string(),
            ..Self::default()
        }
    }
}

/// Aggregate counts per category, as reported by the classification stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RosterStatistics {
    #[serde(default)]
    pub total_uploaded: u32,
    #[serde(default)]
    pub total_processed: u32,
    #[serde(default)]
    pub eligible: u32,
    #[serde(default)]
    pub ineligible: u32,
    #[serde(default)]
    pub discrepancy: u32,
    #[serde(default)]
    pub btz: u32,
    #[serde(default)]
    pub errors: u32,
}

/// Read-only projection over the session's classification output.
///
/// Absent categories deserialize as empty vectors; there are no failure
/// modes here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RosterCategories {
    #[serde(default)]
    pub eligible: Vec<RosterMember>,
    #[serde(default)]
    pub ineligible: Vec<RosterMember>,
    #[serde(default)]
    pub discrepancy: Vec<RosterMember>,
    #[serde(default)]
    pub btz: Vec<RosterMember>,
    #[serde(default)]
    pub small_unit: Vec<RosterMember>,
}

impl RosterCategories {
    pub fn members_of(&self, category: Category) -> &[RosterMember] {
        match category {
            Category::Eligible => &self.eligible,
            Category::Ineligible => &self.ineligible,
            Category::Discrepancy => &self.discrepancy,
            Category::Btz => &self.btz,
            Category::SmallUnit => &self.small_unit,
        }
    }

    /// All members across the five buckets, in the fixed category order.
    pub fn all_members(&self) -> impl Iterator<Item = &RosterMember> {
        Category::ALL
            .iter()
            .flat_map(move |category| self.members_of(*category).iter())
    }

    /// Distinct unit codes within one category, sorted for display.
    pub fn pascodes_in(&self, category: Category) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for member in self.members_of(category) {
            let pas = member.assigned_pas.trim();
            if !pas.is_empty() && !codes.iter().any(|c| c == pas) {
                codes.push(pas.to_string());
            }
        }
        codes.sort();
        codes
    }

    /// Members of one category assigned to a specific unit.
    pub fn members_in_unit<'a>(
        &'a self,
        category: Category,
        pascode: &'a str,
    ) -> impl Iterator<Item = &'a RosterMember> {
        self.members_of(category)
            .iter()
            .filter(move |m| m.assigned_pas.trim() == pascode)
    }

    /// Case-insensitive search over member name and unit code.
    pub fn search<'a>(
        &'a self,
        category: Category,
        term: &str,
    ) -> impl Iterator<Item = &'a RosterMember> {
        let needle = term.to_lowercase();
        self.members_of(category).iter().filter(move |m| {
            needle.is_empty()
                || m.full_name.to_lowercase().contains(&needle)
                || m.assigned_pas.to_lowercase().contains(&needle)
        })
    }
}

/// Session-scoped custom logo state, managed by the logo collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomLogo {
    #[serde(default)]
    pub uploaded: bool,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Partial per-unit signer record as persisted server-side.
///
/// Every field is optional; `OrgInfo::hydrate` turns this into a fully
/// populated local record. `senior_rater_name` is the composite
/// "Last, First Middle" form that older sessions carry instead of the
/// discrete name parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PascodeRecord {
    pub srid: Option<String>,
    pub senior_rater_name: Option<String>,
    pub senior_rater_rank: Option<String>,
    pub senior_rater_title: Option<String>,
    pub senior_rater_first_name: Option<String>,
    pub senior_rater_middle_name: Option<String>,
    pub senior_rater_last_name: Option<String>,
    pub commander_rank: Option<String>,
    pub commander_title: Option<String>,
    pub commander_first_name: Option<String>,
    pub commander_middle_name: Option<String>,
    pub commander_last_name: Option<String>,
}

/// One upload's worth of roster state.
///
/// Created by the upload collaborator, replaced wholesale by each member
/// mutation, and consumed by the org-info layer. The org-info layer only
/// ever reads it; all writes flow through collaborator responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RosterSession {
    pub session_id: String,
    #[serde(default)]
    pub cycle: Cycle,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub statistics: RosterStatistics,
    #[serde(default)]
    pub categories: RosterCategories,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Explicit unit codes. Empty means "derive from categories".
    #[serde(default)]
    pub pascodes: Vec<String>,
    /// Explicit unit code → display name map. Empty means "derive".
    #[serde(default)]
    pub pascode_unit_map: HashMap<String, String>,
    #[serde(default)]
    pub custom_logo: CustomLogo,
    /// Persisted per-unit signer records, keyed by unit code.
    #[serde(default)]
    pub pascode_map: HashMap<String, PascodeRecord>,
    #[serde(default)]
    pub srid_pascode_map: HashMap<String, Vec<String>>,
    /// The single cross-cutting small-unit signer record, if any.
    #[serde(default)]
    pub small_unit_sr: Option<PascodeRecord>,
    /// Server-authoritative flag: does this session need a small-unit
    /// signer? Never re-derived from member data.
    #[serde(default)]
    pub senior_rater_needed: bool,
}

impl RosterSession {
    /// Synthesize a session snapshot when the preview collaborator is
    /// unavailable.
    ///
    /// The result is structurally identical to a fetched snapshot so no
    /// downstream component has to special-case the degraded path. With a
    /// locally known session everything it holds is carried through —
    /// categories, statistics, signer maps — so derivation and
    /// reconciliation see the same unit universe they saw before the
    /// outage. Only with no local session at all does this produce an
    /// empty-bucket skeleton.
    pub fn fallback_snapshot(session_id: &str, local: Option<&RosterSession>) -> RosterSession {
        match local {
            None => RosterSession {
                session_id: session_id.to_string(),
                cycle: Cycle::default(),
                year: Utc::now().year(),
                ..RosterSession::default()
            },
            Some(known) => RosterSession {
                session_id: session_id.to_string(),
                ..known.clone()
            },
        }
    }
}

/// Selectable calendar years for a new upload, newest first.
///
/// The promotion year rolls over on April 1: from that date the upcoming
/// year becomes the default choice.
pub fn year_options(today: NaiveDate) -> [i32; 3] {
    let base = if today.month() >= 4 {
        today.year() + 1
    } else {
        today.year()
    };
    [base, base - 1, base - 2]
}
