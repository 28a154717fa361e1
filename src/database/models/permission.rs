//! Role permission models.
//!
//! Roles, modules and capabilities are closed sets. Names are matched
//! exactly as they are written in the permission table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// User role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Administrator,
    Doctor,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Doctor, Role::Receptionist];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Doctor => "Doctor",
            Self::Receptionist => "Receptionist",
        }
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Functional area of the application; the unit of access control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Module {
    Dashboard,
    PatientManagement,
    Appointments,
    MedicineInventory,
    Prescriptions,
    UserManagement,
    Reports,
    SystemSettings,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::Dashboard,
        Module::PatientManagement,
        Module::Appointments,
        Module::MedicineInventory,
        Module::Prescriptions,
        Module::UserManagement,
        Module::Reports,
        Module::SystemSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::PatientManagement => "PatientManagement",
            Self::Appointments => "Appointments",
            Self::MedicineInventory => "MedicineInventory",
            Self::Prescriptions => "Prescriptions",
            Self::UserManagement => "UserManagement",
            Self::Reports => "Reports",
            Self::SystemSettings => "SystemSettings",
        }
    }
}

impl FromStr for Module {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseError::UnknownModule(s.to_string()))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission verb.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::View,
        Capability::Create,
        Capability::Edit,
        Capability::Delete,
        Capability::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }
}

impl FromStr for Capability {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownCapability(s.to_string()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five capability flags of a (role, module) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct PermissionFlags {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub export: bool,
}

impl PermissionFlags {
    /// All capabilities denied.
    pub const NONE: Self = Self::new(false, false, false, false, false);

    /// All capabilities granted.
    pub const ALL: Self = Self::new(true, true, true, true, true);

    /// Flags in view/create/edit/delete/export order.
    pub const fn new(view: bool, create: bool, edit: bool, delete: bool, export: bool) -> Self {
        Self {
            view,
            create,
            edit,
            delete,
            export,
        }
    }

    /// Whether this set of flags grants a capability.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.view,
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Export => self.export,
        }
    }
}

/// Stored permissions for one (role, module) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionEntry {
    pub role: Role,
    pub module: Module,

    #[serde(flatten)]
    pub flags: PermissionFlags,

    pub last_modified: DateTime<Utc>,

    #[serde(default)]
    pub modified_by: Option<String>,
}

impl PermissionEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(role: Role, module: Module, flags: PermissionFlags, modified_by: Option<String>) -> Self {
        Self {
            role,
            module,
            flags,
            last_modified: Utc::now(),
            modified_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_and_module_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for module in Module::ALL {
            assert_eq!(module.to_string().parse::<Module>().unwrap(), module);
        }
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert!("Nurse".parse::<Role>().is_err());
        assert!("administrator".parse::<Role>().is_err());
        assert!("Billing".parse::<Module>().is_err());
        assert!("approve".parse::<Capability>().is_err());
    }

    #[test]
    fn test_capability_names_ignore_case() {
        assert_eq!("View".parse::<Capability>().unwrap(), Capability::View);
        assert_eq!("export".parse::<Capability>().unwrap(), Capability::Export);
    }

    #[test]
    fn test_flags_allow() {
        let flags = PermissionFlags::new(true, false, true, false, false);

        assert!(flags.allows(Capability::View));
        assert!(!flags.allows(Capability::Create));
        assert!(flags.allows(Capability::Edit));
        assert!(!flags.allows(Capability::Delete));
        assert!(!flags.allows(Capability::Export));
    }

    #[test]
    fn test_entry_document_has_flat_flags() {
        let entry = PermissionEntry::new(
            Role::Doctor,
            Module::Reports,
            PermissionFlags::new(true, true, false, false, true),
            Some("admin".into()),
        );
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["role"], "Doctor");
        assert_eq!(value["module"], "Reports");
        assert_eq!(value["create"], true);
        assert_eq!(value["delete"], false);
    }
}
