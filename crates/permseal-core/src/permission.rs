//! The platform's permission catalogue.
//!
//! Permissions are opaque strings on the wire. This enum names the set the
//! platform currently defines; the encryption engines accept any string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A permission from the platform catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "canViewDashboard")]
    ViewDashboard,
    #[serde(rename = "canViewSkills")]
    ViewSkills,
    #[serde(rename = "canEditOwnSkills")]
    EditOwnSkills,
    #[serde(rename = "canEditTeamSkills")]
    EditTeamSkills,
    #[serde(rename = "canEditAllSkills")]
    EditAllSkills,
    #[serde(rename = "canViewLearning")]
    ViewLearning,
    #[serde(rename = "canEditOwnLearning")]
    EditOwnLearning,
    #[serde(rename = "canEditTeamLearning")]
    EditTeamLearning,
    #[serde(rename = "canEditAllLearning")]
    EditAllLearning,
    #[serde(rename = "canViewReports")]
    ViewReports,
    #[serde(rename = "canManageTeam")]
    ManageTeam,
    #[serde(rename = "canManageSystem")]
    ManageSystem,
    #[serde(rename = "canManageUsers")]
    ManageUsers,
}

impl Permission {
    /// Every permission in the catalogue, in declaration order.
    pub const ALL: [Permission; 13] = [
        Permission::ViewDashboard,
        Permission::ViewSkills,
        Permission::EditOwnSkills,
        Permission::EditTeamSkills,
        Permission::EditAllSkills,
        Permission::ViewLearning,
        Permission::EditOwnLearning,
        Permission::EditTeamLearning,
        Permission::EditAllLearning,
        Permission::ViewReports,
        Permission::ManageTeam,
        Permission::ManageSystem,
        Permission::ManageUsers,
    ];

    /// The wire identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "canViewDashboard",
            Permission::ViewSkills => "canViewSkills",
            Permission::EditOwnSkills => "canEditOwnSkills",
            Permission::EditTeamSkills => "canEditTeamSkills",
            Permission::EditAllSkills => "canEditAllSkills",
            Permission::ViewLearning => "canViewLearning",
            Permission::EditOwnLearning => "canEditOwnLearning",
            Permission::EditTeamLearning => "canEditTeamLearning",
            Permission::EditAllLearning => "canEditAllLearning",
            Permission::ViewReports => "canViewReports",
            Permission::ManageTeam => "canManageTeam",
            Permission::ManageSystem => "canManageSystem",
            Permission::ManageUsers => "canManageUsers",
        }
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPermission(s.to_string()))
    }
}
