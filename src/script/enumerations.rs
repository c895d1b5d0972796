//! Value sets of the enum-like script parameter kinds
//!
//! Each kind has its own registry; the same numeric value means different things
//! for different kinds, so lookups always go through the parameter type.

use super::parameter::ParameterType;

/// Named members of one enum-like parameter kind
#[derive(Debug)]
pub struct Enumeration {
    pub name: &'static str,
    members: &'static [(&'static str, i16)],
    /// Any non-negative value is valid; members only name the common ones
    open: bool,
}

impl Enumeration {
    pub fn members(&self) -> &'static [(&'static str, i16)] {
        self.members
    }

    pub fn name_of(&self, value: i16) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }

    pub fn value_of(&self, name: &str) -> Option<i16> {
        self.members
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, value: i16) -> bool {
        self.name_of(value).is_some()
    }

    /// Whether `value` may be stored for this kind
    pub fn accepts(&self, value: i16) -> bool {
        if self.open {
            value >= 0
        } else {
            self.contains(value)
        }
    }
}

/// Registry for `kind`, or `None` if it is not enum-like
pub fn enumeration(kind: ParameterType) -> Option<&'static Enumeration> {
    match kind {
        ParameterType::ComparisonOperator => Some(&COMPARISON_OPERATOR),
        ParameterType::Surface => Some(&SURFACE),
        ParameterType::ShakeIntensity => Some(&SHAKE_INTENSITY),
        ParameterType::Mood => Some(&MOOD),
        ParameterType::EvacuationSide => Some(&EVACUATION_SIDE),
        ParameterType::RadarEvent => Some(&RADAR_EVENT),
        ParameterType::Buildability => Some(&BUILDABILITY),
        ParameterType::Boundary => Some(&BOUNDARY),
        ParameterType::KindOf => Some(&KIND_OF),
        _ => None,
    }
}

pub static COMPARISON_OPERATOR: Enumeration = Enumeration {
    name: "ComparisonOperator",
    open: false,
    members: &[
        ("LessThan", 0),
        ("LessEqual", 1),
        ("Equal", 2),
        ("GreaterEqual", 3),
        ("Greater", 4),
        ("NotEqual", 5),
    ],
};

pub static SURFACE: Enumeration = Enumeration {
    name: "Surface",
    open: false,
    members: &[("Ground", 1), ("Air", 2), ("GroundOrAir", 3)],
};

pub static SHAKE_INTENSITY: Enumeration = Enumeration {
    name: "ShakeIntensity",
    open: false,
    members: &[
        ("Subtle", 0),
        ("Normal", 1),
        ("Strong", 2),
        ("Severe", 3),
        ("Cine_Extreme", 4),
        ("Cine_Insane", 5),
    ],
};

pub static MOOD: Enumeration = Enumeration {
    name: "Mood",
    open: false,
    members: &[
        ("Sleep", -2),
        ("Passive", -1),
        ("Normal", 0),
        ("Alert", 1),
        ("Aggressive", 2),
    ],
};

pub static EVACUATION_SIDE: Enumeration = Enumeration {
    name: "EvacuationSide",
    open: false,
    members: &[("Unspecified", 0), ("Left", 1), ("Right", 2), ("Center", 3)],
};

pub static RADAR_EVENT: Enumeration = Enumeration {
    name: "RadarEvent",
    open: false,
    members: &[
        ("Invalid", 0),
        ("Construction", 1),
        ("Upgrade", 2),
        ("UnderAttack", 3),
        ("Information", 4),
        ("BeaconPulse", 5),
        ("Infiltration", 6),
        ("BattlePlan", 7),
        ("StealthDiscovered", 8),
        ("StealthNeutralized", 9),
        ("Fake", 10),
    ],
};

pub static BUILDABILITY: Enumeration = Enumeration {
    name: "Buildability",
    open: false,
    members: &[
        ("Yes", 0),
        ("IgnorePrerequisites", 1),
        ("No", 2),
        ("OnlyByAi", 3),
    ],
};

/// Map-defined boundary index
pub static BOUNDARY: Enumeration = Enumeration {
    name: "Boundary",
    open: true,
    members: &[
        ("Boundary1", 0),
        ("Boundary2", 1),
        ("Boundary3", 2),
        ("Boundary4", 3),
        ("Boundary5", 4),
        ("Boundary6", 5),
    ],
};

/// Object KindOf bits, numbered in declaration order
pub static KIND_OF: Enumeration = Enumeration {
    name: "KindOf",
    open: false,
    members: &[
        ("OBSTACLE", 0),
        ("SELECTABLE", 1),
        ("IMMOBILE", 2),
        ("CAN_ATTACK", 3),
        ("STICK_TO_TERRAIN_SLOPE", 4),
        ("CAN_CAST_REFLECTIONS", 5),
        ("SHRUBBERY", 6),
        ("STRUCTURE", 7),
        ("INFANTRY", 8),
        ("VEHICLE", 9),
        ("AIRCRAFT", 10),
        ("HUGE_VEHICLE", 11),
        ("DOZER", 12),
        ("HARVESTER", 13),
        ("COMMANDCENTER", 14),
        ("LINEBUILD", 15),
        ("SALVAGER", 16),
        ("WEAPON_SALVAGER", 17),
        ("TRANSPORT", 18),
        ("BRIDGE", 19),
        ("LANDMARK_BRIDGE", 20),
        ("BRIDGE_TOWER", 21),
        ("PROJECTILE", 22),
        ("PRELOAD", 23),
        ("NO_GARRISON", 24),
        ("WAVEGUIDE", 25),
        ("WAVE_EFFECT", 26),
        ("NO_COLLIDE", 27),
        ("REPAIR_PAD", 28),
        ("HEAL_PAD", 29),
        ("STEALTH_GARRISON", 30),
        ("CASH_GENERATOR", 31),
        ("DRAWABLE_ONLY", 32),
        ("MP_COUNT_FOR_VICTORY", 33),
        ("REBUILD_HOLE", 34),
        ("SCORE", 35),
        ("SCORE_CREATE", 36),
        ("SCORE_DESTROY", 37),
        ("NO_HEAL_ICON", 38),
        ("CAN_RAPPEL", 39),
        ("PARACHUTABLE", 40),
        ("CAN_BE_REPULSED", 41),
        ("MOB_NEXUS", 42),
        ("IGNORED_IN_GUI", 43),
        ("CRATE", 44),
        ("CAPTURABLE", 45),
        ("CLEARED_BY_BUILD", 46),
        ("SMALL_MISSILE", 47),
        ("ALWAYS_VISIBLE", 48),
        ("UNATTACKABLE", 49),
        ("MINE", 50),
        ("CLEANUP_HAZARD", 51),
        ("PORTABLE_STRUCTURE", 52),
        ("ALWAYS_SELECTABLE", 53),
        ("ATTACK_NEEDS_LINE_OF_SIGHT", 54),
        ("WALK_ON_TOP_OF_WALL", 55),
        ("DEFENSIVE_WALL", 56),
        ("FS_POWER", 57),
        ("FS_FACTORY", 58),
        ("FS_BASE_DEFENSE", 59),
        ("FS_TECHNOLOGY", 60),
        ("AIRCRAFT_PATH_AROUND", 61),
        ("LOW_OVERLAP", 62),
        ("FORCEATTACKABLE", 63),
        ("AUTO_RALLYPOINT", 64),
        ("TECH_BUILDING", 65),
        ("POWERED", 66),
        ("PRODUCED_AT_HELIPAD", 67),
        ("DRONE", 68),
        ("CAN_SEE_THROUGH_STRUCTURE", 69),
        ("BALLISTIC_MISSILE", 70),
        ("CLICK_THROUGH", 71),
        ("SUPPLY_SOURCE_ON_PREVIEW", 72),
        ("PARACHUTE", 73),
        ("GARRISONABLE_UNTIL_DESTROYED", 74),
        ("BOAT", 75),
        ("IMMUNE_TO_CAPTURE", 76),
        ("HULK", 77),
        ("SHOW_PORTRAIT_WHEN_CONTROLLED", 78),
        ("SPAWNS_ARE_THE_WEAPONS", 79),
        ("CANNOT_BUILD_NEAR_SUPPLIES", 80),
        ("SUPPLY_SOURCE", 81),
        ("REVEAL_TO_ALL", 82),
        ("DISGUISER", 83),
        ("INERT", 84),
        ("HERO", 85),
        ("IGNORES_SELECT_ALL", 86),
        ("DONT_AUTO_CRUSH_INFANTRY", 87),
        ("CLIFF_JUMPER", 88),
        ("FS_SUPPLY_DROPZONE", 89),
        ("FS_SUPERWEAPON", 90),
        ("FS_BLACK_MARKET", 91),
        ("FS_SUPPLY_CENTER", 92),
        ("FS_STRATEGY_CENTER", 93),
        ("MONEY_HACKER", 94),
        ("ARMOR_SALVAGER", 95),
        ("REVEALS_ENEMY_PATHS", 96),
        ("BOOBY_TRAP", 97),
        ("FS_FAKE", 98),
        ("FS_INTERNET_CENTER", 99),
        ("BLAST_CRATER", 100),
        ("PROP", 101),
        ("OPTIMIZED_TREE", 102),
        ("FS_ADVANCED_TECH", 103),
        ("FS_BARRACKS", 104),
        ("FS_WARFACTORY", 105),
        ("FS_AIRFIELD", 106),
        ("AIRCRAFT_CARRIER", 107),
        ("NO_SELECT", 108),
        ("REJECT_UNMANNED", 109),
        ("CANNOT_RETALIATE", 110),
        ("TECH_BASE_DEFENSE", 111),
        ("EMP_HARDENED", 112),
        ("DEMOTRAP", 113),
        ("CONSERVATIVE_BUILDING", 114),
        ("IGNORE_DOCKING_BONES", 115),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries_are_keyed_by_kind() {
        // Value 0 means different things per kind.
        let compare = enumeration(ParameterType::ComparisonOperator).unwrap();
        let shake = enumeration(ParameterType::ShakeIntensity).unwrap();
        assert_eq!(compare.name_of(0), Some("LessThan"));
        assert_eq!(shake.name_of(0), Some("Subtle"));

        assert!(!enumeration(ParameterType::Surface).unwrap().contains(0));
        assert_eq!(enumeration(ParameterType::Mood).unwrap().value_of("Sleep"), Some(-2));
        assert!(enumeration(ParameterType::Integer).is_none());
    }

    #[test]
    fn test_members_are_unique() {
        for registry in [
            &COMPARISON_OPERATOR,
            &SURFACE,
            &SHAKE_INTENSITY,
            &MOOD,
            &EVACUATION_SIDE,
            &RADAR_EVENT,
            &BUILDABILITY,
            &BOUNDARY,
            &KIND_OF,
        ] {
            for (i, (name, value)) in registry.members().iter().enumerate() {
                assert_eq!(registry.value_of(name), Some(*value), "{}", registry.name);
                assert!(
                    registry.members()[i + 1..].iter().all(|(n, v)| n != name && v != value),
                    "{} has duplicate {name}",
                    registry.name
                );
            }
        }
    }

    #[test]
    fn test_kind_of_is_numbered_in_order() {
        for (i, (_, value)) in KIND_OF.members().iter().enumerate() {
            assert_eq!(*value as usize, i);
        }
        assert_eq!(KIND_OF.name_of(7), Some("STRUCTURE"));
    }

    #[test]
    fn test_boundary_accepts_any_index() {
        assert!(BOUNDARY.accepts(0));
        assert!(BOUNDARY.accepts(40));
        assert_eq!(BOUNDARY.name_of(40), None);
        assert!(!BOUNDARY.accepts(-1));
        assert!(!SURFACE.accepts(4));
    }
}
