use super::{Role, Team};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RosterEntry {
    pub name: &'static str,
    pub role: Role,
}

const fn leader(name: &'static str) -> RosterEntry {
    RosterEntry {
        name,
        role: Role::Leader,
    }
}

const fn member(name: &'static str) -> RosterEntry {
    RosterEntry {
        name,
        role: Role::Member,
    }
}

/// Team membership in effect from `effective_from` until the next version.
#[derive(Debug, Serialize)]
pub struct RosterVersion {
    #[serde(rename = "effectiveFrom")]
    pub effective_from: NaiveDate,
    pub teams: [(Team, &'static [RosterEntry]); 4],
}

impl RosterVersion {
    pub fn members(&self, team: Team) -> &'static [RosterEntry] {
        self.teams
            .iter()
            .find(|(t, _)| *t == team)
            .map(|(_, entries)| *entries)
            .unwrap_or(&[])
    }

    pub fn find(&self, name: &str) -> Option<(Team, RosterEntry)> {
        let name = name.trim();
        self.teams.iter().find_map(|(team, entries)| {
            entries
                .iter()
                .find(|entry| entry.name == name)
                .map(|entry| (*team, *entry))
        })
    }

    pub fn team_of(&self, name: &str) -> Option<Team> {
        self.find(name).map(|(team, _)| team)
    }

    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.find(name).map(|(_, entry)| entry.role)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.teams
            .iter()
            .flat_map(|(_, entries)| entries.iter().map(|entry| entry.name))
    }
}

const FIRST_A: &[RosterEntry] = &[
    leader("Chen Wei"),
    member("Lin Mei"),
    member("Wang Jun"),
    member("Huang Li"),
];
const FIRST_B: &[RosterEntry] = &[
    leader("Chang Hao"),
    member("Liu Yan"),
    member("Tsai Ming"),
    member("Yang Ting"),
];
const FIRST_C: &[RosterEntry] = &[
    leader("Wu Kai"),
    member("Cheng Yu"),
    member("Hsu Ning"),
    member("Kuo Fang"),
];
const FIRST_D: &[RosterEntry] = &[
    leader("Lee Shan"),
    member("Chou Ping"),
    member("Lai Chun"),
    member("Hsieh Lan"),
];

// Tsai Ming and Hsieh Lan swapped crews, Pan Rui joined C.
const SECOND_B: &[RosterEntry] = &[
    leader("Chang Hao"),
    member("Liu Yan"),
    member("Hsieh Lan"),
    member("Yang Ting"),
];
const SECOND_C: &[RosterEntry] = &[
    leader("Wu Kai"),
    member("Cheng Yu"),
    member("Hsu Ning"),
    member("Kuo Fang"),
    member("Pan Rui"),
];
const SECOND_D: &[RosterEntry] = &[
    leader("Lee Shan"),
    member("Chou Ping"),
    member("Lai Chun"),
    member("Tsai Ming"),
];

// Liu Yan took over B, Chang Hao moved to A, Tseng Yi joined A.
const THIRD_A: &[RosterEntry] = &[
    leader("Chen Wei"),
    member("Lin Mei"),
    member("Wang Jun"),
    member("Huang Li"),
    member("Chang Hao"),
    member("Tseng Yi"),
];
const THIRD_B: &[RosterEntry] = &[
    leader("Liu Yan"),
    member("Hsieh Lan"),
    member("Yang Ting"),
];

lazy_static! {
    /// Ordered latest first.
    static ref ROSTER_VERSIONS: [RosterVersion; 3] = [
        RosterVersion {
            effective_from: NaiveDate::from_ymd_opt(2026, 1, 1)
                .expect("valid cutover date"),
            teams: [
                (Team::A, THIRD_A),
                (Team::B, THIRD_B),
                (Team::C, SECOND_C),
                (Team::D, SECOND_D),
            ],
        },
        RosterVersion {
            effective_from: NaiveDate::from_ymd_opt(2025, 7, 1)
                .expect("valid cutover date"),
            teams: [
                (Team::A, FIRST_A),
                (Team::B, SECOND_B),
                (Team::C, SECOND_C),
                (Team::D, SECOND_D),
            ],
        },
        RosterVersion {
            effective_from: NaiveDate::MIN,
            teams: [
                (Team::A, FIRST_A),
                (Team::B, FIRST_B),
                (Team::C, FIRST_C),
                (Team::D, FIRST_D),
            ],
        },
    ];
}

pub fn roster_versions() -> &'static [RosterVersion] {
    ROSTER_VERSIONS.as_slice()
}

/// The roster in effect on `date`.
pub fn roster_for(date: NaiveDate) -> &'static RosterVersion {
    let versions = roster_versions();
    versions
        .iter()
        .find(|version| date >= version.effective_from)
        .unwrap_or(&versions[versions.len() - 1])
}

pub fn team_of(name: &str, date: NaiveDate) -> Option<Team> {
    roster_for(date).team_of(name)
}

pub fn role_of(name: &str, date: NaiveDate) -> Option<Role> {
    roster_for(date).role_of(name)
}
