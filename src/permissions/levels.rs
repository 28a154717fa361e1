//! Named access-level presets and default role templates.

use std::fmt;

use crate::database::{Module, PermissionFlags, Role};

/// A named combination of capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    FullAccess,
    ReadWrite,
    ViewCreate,
    ViewOnly,
    NoAccess,
}

const T: bool = true;
const F: bool = false;

/// Preset → flags, in view/create/edit/delete/export order.
pub const ACCESS_LEVELS: [(AccessLevel, PermissionFlags); 5] = [
    (AccessLevel::FullAccess, PermissionFlags::new(T, T, T, T, T)),
    (AccessLevel::ReadWrite, PermissionFlags::new(T, T, T, F, T)),
    (AccessLevel::ViewCreate, PermissionFlags::new(T, T, F, F, T)),
    (AccessLevel::ViewOnly, PermissionFlags::new(T, F, F, F, F)),
    (AccessLevel::NoAccess, PermissionFlags::new(F, F, F, F, F)),
];

impl AccessLevel {
    pub const ALL: [AccessLevel; 5] = [
        AccessLevel::FullAccess,
        AccessLevel::ReadWrite,
        AccessLevel::ViewCreate,
        AccessLevel::ViewOnly,
        AccessLevel::NoAccess,
    ];

    /// Display name as shown in the role editor.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullAccess => "Full Access",
            Self::ReadWrite => "Read & Write",
            Self::ViewCreate => "View & Create",
            Self::ViewOnly => "View Only",
            Self::NoAccess => "No Access",
        }
    }

    /// Parse a display name. Unrecognized names are `NoAccess`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name))
            .unwrap_or(Self::NoAccess)
    }

    pub fn flags(&self) -> PermissionFlags {
        ACCESS_LEVELS
            .iter()
            .find(|(level, _)| level == self)
            .map(|(_, flags)| *flags)
            .unwrap_or(PermissionFlags::NONE)
    }

    /// The preset matching `flags` exactly, or `None` for a custom mix.
    pub fn from_flags(flags: PermissionFlags) -> Option<Self> {
        ACCESS_LEVELS
            .iter()
            .find(|(_, preset)| *preset == flags)
            .map(|(level, _)| *level)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const FULL: PermissionFlags = PermissionFlags::ALL;
const NONE: PermissionFlags = PermissionFlags::NONE;

/// Default flags per role, indexed like `Module::ALL`.
const DEFAULT_TEMPLATES: [(Role, [PermissionFlags; 8]); 3] = [
    (Role::Administrator, [FULL; 8]),
    (
        Role::Doctor,
        [
            PermissionFlags::new(T, F, F, F, T), // Dashboard
            PermissionFlags::new(T, T, T, F, T), // PatientManagement
            PermissionFlags::new(T, T, T, T, T), // Appointments
            PermissionFlags::new(T, F, F, F, F), // MedicineInventory
            PermissionFlags::new(T, T, T, T, T), // Prescriptions
            NONE,                                // UserManagement
            PermissionFlags::new(T, T, F, F, T), // Reports
            NONE,                                // SystemSettings
        ],
    ),
    (
        Role::Receptionist,
        [
            PermissionFlags::new(T, F, F, F, F), // Dashboard
            PermissionFlags::new(T, T, T, F, T), // PatientManagement
            PermissionFlags::new(T, T, T, T, T), // Appointments
            PermissionFlags::new(T, F, F, F, F), // MedicineInventory
            PermissionFlags::new(T, F, F, F, T), // Prescriptions
            NONE,                                // UserManagement
            PermissionFlags::new(T, F, F, F, T), // Reports
            NONE,                                // SystemSettings
        ],
    ),
];

/// Default template of a role: every module with its flags.
pub fn role_template(role: Role) -> impl Iterator<Item = (Module, PermissionFlags)> {
    let flags = DEFAULT_TEMPLATES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, flags)| *flags)
        .unwrap_or([NONE; 8]);

    Module::ALL.into_iter().zip(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Capability;

    #[test]
    fn test_preset_table() {
        let view_only = AccessLevel::ViewOnly.flags();
        assert!(view_only.view);
        assert!(!view_only.create && !view_only.edit && !view_only.delete && !view_only.export);

        let read_write = AccessLevel::ReadWrite.flags();
        assert!(!read_write.delete);
        assert!(read_write.export);

        assert_eq!(AccessLevel::FullAccess.flags(), PermissionFlags::ALL);
        assert_eq!(AccessLevel::NoAccess.flags(), PermissionFlags::NONE);
    }

    #[test]
    fn test_names_round_trip_and_unknown_is_no_access() {
        for level in AccessLevel::ALL {
            assert_eq!(AccessLevel::from_name(level.name()), level);
        }
        assert_eq!(AccessLevel::from_name("view only"), AccessLevel::ViewOnly);
        assert_eq!(AccessLevel::from_name("Superuser"), AccessLevel::NoAccess);
        assert_eq!(AccessLevel::from_name(""), AccessLevel::NoAccess);
    }

    #[test]
    fn test_from_flags() {
        for (level, flags) in ACCESS_LEVELS {
            assert_eq!(AccessLevel::from_flags(flags), Some(level));
        }
        assert_eq!(AccessLevel::from_flags(PermissionFlags::new(F, T, F, F, F)), None);
    }

    /// Parse "T/F/F/F/T" in view/create/edit/delete/export order.
    fn flags(cells: &str) -> PermissionFlags {
        let bits: Vec<bool> = cells.split('/').map(|c| c == "T").collect();
        assert_eq!(bits.len(), 5, "bad cell {}", cells);
        PermissionFlags::new(bits[0], bits[1], bits[2], bits[3], bits[4])
    }

    #[test]
    fn test_templates_match_role_table() {
        let all = "T/T/T/T/T";
        let none = "F/F/F/F/F";
        let table = [
            (Role::Administrator, [all, all, all, all, all, all, all, all]),
            (
                Role::Doctor,
                ["T/F/F/F/T", "T/T/T/F/T", "T/T/T/T/T", "T/F/F/F/F", "T/T/T/T/T", none, "T/T/F/F/T", none],
            ),
            (
                Role::Receptionist,
                ["T/F/F/F/F", "T/T/T/F/T", "T/T/T/T/T", "T/F/F/F/F", "T/F/F/F/T", none, "T/F/F/F/T", none],
            ),
        ];
        let modules = [
            Module::Dashboard,
            Module::PatientManagement,
            Module::Appointments,
            Module::MedicineInventory,
            Module::Prescriptions,
            Module::UserManagement,
            Module::Reports,
            Module::SystemSettings,
        ];

        for (role, cells) in table {
            let template: Vec<_> = role_template(role).collect();
            assert_eq!(template.len(), 8);
            for (module, expected) in modules.into_iter().zip(cells) {
                let actual = template
                    .iter()
                    .find(|(m, _)| *m == module)
                    .map(|(_, f)| *f);
                assert_eq!(actual, Some(flags(expected)), "{} / {}", role, module);
            }
        }
    }

    #[test]
    fn test_non_admin_roles_never_manage_users_or_settings() {
        for role in [Role::Doctor, Role::Receptionist] {
            for (module, flags) in role_template(role) {
                if matches!(module, Module::UserManagement | Module::SystemSettings) {
                    assert!(!flags.allows(Capability::View), "{} / {}", role, module);
                    assert_eq!(flags, PermissionFlags::NONE);
                }
            }
        }
    }
}
