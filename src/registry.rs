//! Static registry of the NCO operators this crate knows how to drive.
//!
//! Every operator is described by an [`OperationSpec`]: the executable name and the
//! option keys it accepts, each paired with the [`FlagRule`] that turns a value into
//! command-line tokens. The tables are plain `static` data, so they need no
//! initialization and can be read from any thread.

use crate::error::{NcoError, Result};
use std::fmt;
use std::str::FromStr;

/// How one named option becomes zero or more argument tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    /// Emits the token when the value is truthy, nothing otherwise.
    Switch(&'static str),
    /// Emits a single `prefix` + value token, e.g. `--dbg_lvl=3`.
    Joined(&'static str),
    /// Emits the flag and the value as two tokens, e.g. `-d time,5,7`.
    Separate(&'static str),
    /// Like [`FlagRule::Joined`], but the value must be one of `choices`.
    Choice {
        prefix: &'static str,
        choices: &'static [&'static str],
    },
}

/// A recognized option key and the rule it follows.
///
/// Several keys may share one rule; they are aliases of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRule {
    pub key: &'static str,
    pub rule: FlagRule,
}

const fn switch(key: &'static str, token: &'static str) -> OptionRule {
    OptionRule {
        key,
        rule: FlagRule::Switch(token),
    }
}

const fn joined(key: &'static str, prefix: &'static str) -> OptionRule {
    OptionRule {
        key,
        rule: FlagRule::Joined(prefix),
    }
}

const fn separate(key: &'static str, flag: &'static str) -> OptionRule {
    OptionRule {
        key,
        rule: FlagRule::Separate(flag),
    }
}

/// Output file formats accepted by `--fl_fmt`.
pub const FILE_FORMATS: &[&str] = &["classic", "64bit", "netcdf4_classic", "netcdf4"];

/// Options understood by every operator.
const COMMON: &[OptionRule] = &[
    switch("overwrite", "-O"),
    switch("append", "-A"),
    switch("apn", "-A"),
    switch("no_tmp_fl", "--no_tmp_fl"),
    switch("wrt_tmp_fl", "--wrt_tmp_fl"),
    switch("create_ram", "--create_ram"),
    switch("open_ram", "--open_ram"),
    OptionRule {
        key: "fl_fmt",
        rule: FlagRule::Choice {
            prefix: "--fl_fmt=",
            choices: FILE_FORMATS,
        },
    },
    switch("hdf4", "--hdf4"),
    separate("path", "-p"),
    joined("dbg_lvl", "--dbg_lvl="),
    switch("history", "-h"),
    separate("threads", "-t"),
];

/// Variable and hyperslab selection.
const SUBSET: &[OptionRule] = &[
    separate("variable", "-v"),
    switch("exclude", "-x"),
    switch("fortran", "-F"),
    separate("dimension", "-d"),
];

/// Operators that read a list of input files.
const MULTI_FILE: &[OptionRule] = &[separate("nintap", "-n")];

const NCKS_ONLY: &[OptionRule] = &[joined("fix_rec_dmn", "--fix_rec_dmn="), switch("metadata", "-M")];
const NCRA_ONLY: &[OptionRule] = &[switch("mro", "--mro")];
const NCRCAT_ONLY: &[OptionRule] = &[switch("rec_apn", "--rec_apn")];
const NCECAT_ONLY: &[OptionRule] = &[separate("record_name", "-u")];
const NCPDQ_ONLY: &[OptionRule] = &[separate("arrange", "-a"), separate("pack_policy", "-P")];
const NCWA_ONLY: &[OptionRule] = &[separate("average", "-a"), separate("weight", "-w")];
const NCBO_ONLY: &[OptionRule] = &[joined("op_typ", "--op_typ=")];

/// Static description of one external command.
#[derive(Debug)]
pub struct OperationSpec {
    /// Executable name looked up on the search path.
    pub program: &'static str,
    /// Option groups in emission order.
    pub groups: &'static [&'static [OptionRule]],
}

impl OperationSpec {
    /// All recognized options, in the order their flags are emitted.
    pub fn rules(&self) -> impl Iterator<Item = &'static OptionRule> {
        self.groups.iter().copied().flatten()
    }

    pub fn find(&self, key: &str) -> Option<&'static OptionRule> {
        self.rules().find(|r| r.key == key)
    }

    pub fn recognizes(&self, key: &str) -> bool {
        self.find(key).is_some()
    }
}

static NCKS: OperationSpec = OperationSpec {
    program: "ncks",
    groups: &[COMMON, SUBSET, NCKS_ONLY],
};

static NCRA: OperationSpec = OperationSpec {
    program: "ncra",
    groups: &[COMMON, SUBSET, MULTI_FILE, NCRA_ONLY],
};

static NCRCAT: OperationSpec = OperationSpec {
    program: "ncrcat",
    groups: &[COMMON, SUBSET, MULTI_FILE, NCRCAT_ONLY],
};

static NCECAT: OperationSpec = OperationSpec {
    program: "ncecat",
    groups: &[COMMON, SUBSET, MULTI_FILE, NCECAT_ONLY],
};

static NCPDQ: OperationSpec = OperationSpec {
    program: "ncpdq",
    groups: &[COMMON, SUBSET, NCPDQ_ONLY],
};

static NCWA: OperationSpec = OperationSpec {
    program: "ncwa",
    groups: &[COMMON, SUBSET, NCWA_ONLY],
};

static NCBO: OperationSpec = OperationSpec {
    program: "ncbo",
    groups: &[COMMON, SUBSET, NCBO_ONLY],
};

/// The supported NCO operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Kitchen sink: extract, subset, convert.
    Ncks,
    /// Record averager.
    Ncra,
    /// Record concatenator.
    Ncrcat,
    /// Ensemble concatenator.
    Ncecat,
    /// Permute dimensions, pack data.
    Ncpdq,
    /// Weighted averager.
    Ncwa,
    /// Binary operator.
    Ncbo,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Ncks,
        Operation::Ncra,
        Operation::Ncrcat,
        Operation::Ncecat,
        Operation::Ncpdq,
        Operation::Ncwa,
        Operation::Ncbo,
    ];

    pub fn spec(self) -> &'static OperationSpec {
        match self {
            Operation::Ncks => &NCKS,
            Operation::Ncra => &NCRA,
            Operation::Ncrcat => &NCRCAT,
            Operation::Ncecat => &NCECAT,
            Operation::Ncpdq => &NCPDQ,
            Operation::Ncwa => &NCWA,
            Operation::Ncbo => &NCBO,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().program
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = NcoError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| NcoError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert!(matches!(
            "ncap2".parse::<Operation>(),
            Err(NcoError::UnknownOperation(name)) if name == "ncap2"
        ));
    }

    #[test]
    fn test_common_options_everywhere() {
        let documented = [
            "overwrite", "append", "apn", "no_tmp_fl", "wrt_tmp_fl", "create_ram", "open_ram",
            "fl_fmt", "hdf4", "dimension", "fortran", "path", "dbg_lvl",
        ];
        for op in Operation::ALL {
            for key in documented {
                assert!(op.spec().recognizes(key), "{op} should accept {key}");
            }
        }
    }

    #[test]
    fn test_operator_specific_options() {
        assert!(Operation::Ncks.spec().recognizes("fix_rec_dmn"));
        assert!(!Operation::Ncra.spec().recognizes("fix_rec_dmn"));

        assert!(Operation::Ncra.spec().recognizes("mro"));
        assert!(Operation::Ncra.spec().recognizes("nintap"));
        assert!(!Operation::Ncks.spec().recognizes("nintap"));

        assert!(Operation::Ncrcat.spec().recognizes("rec_apn"));
        assert!(!Operation::Ncra.spec().recognizes("rec_apn"));

        assert!(Operation::Ncpdq.spec().recognizes("arrange"));
        assert!(!Operation::Ncks.spec().recognizes("arrange"));
    }

    #[test]
    fn test_ncecat_ncwa_ncbo_tables() {
        let ncecat = Operation::Ncecat.spec();
        assert_eq!(ncecat.find("record_name").unwrap().rule, FlagRule::Separate("-u"));
        assert!(ncecat.recognizes("nintap"));
        assert!(!ncecat.recognizes("mro"));

        let ncwa = Operation::Ncwa.spec();
        assert_eq!(ncwa.find("average").unwrap().rule, FlagRule::Separate("-a"));
        assert_eq!(ncwa.find("weight").unwrap().rule, FlagRule::Separate("-w"));
        assert!(!ncwa.recognizes("nintap"));
        assert!(!ncwa.recognizes("arrange"));

        let ncbo = Operation::Ncbo.spec();
        assert_eq!(ncbo.find("op_typ").unwrap().rule, FlagRule::Joined("--op_typ="));
        assert!(!ncbo.recognizes("average"));
        assert!(!Operation::Ncks.spec().recognizes("op_typ"));
    }

    #[test]
    fn test_added_common_options() {
        for op in Operation::ALL {
            let spec = op.spec();
            assert_eq!(spec.find("history").unwrap().rule, FlagRule::Switch("-h"), "{op}");
            assert_eq!(spec.find("threads").unwrap().rule, FlagRule::Separate("-t"), "{op}");
            assert_eq!(spec.find("variable").unwrap().rule, FlagRule::Separate("-v"), "{op}");
            assert_eq!(spec.find("exclude").unwrap().rule, FlagRule::Switch("-x"), "{op}");
        }
        assert_eq!(Operation::Ncks.spec().find("metadata").unwrap().rule, FlagRule::Switch("-M"));
        assert_eq!(Operation::Ncpdq.spec().find("pack_policy").unwrap().rule, FlagRule::Separate("-P"));
    }

    #[test]
    fn test_aliases_share_a_rule() {
        let spec = Operation::Ncks.spec();
        assert_eq!(spec.find("append").unwrap().rule, spec.find("apn").unwrap().rule);
    }

    #[test]
    fn test_keys_unique_per_operation() {
        for op in Operation::ALL {
            let mut seen = HashSet::new();
            for rule in op.spec().rules() {
                assert!(seen.insert(rule.key), "{op} lists {} twice", rule.key);
            }
        }
    }

    #[test]
    fn test_reserved_fields_are_not_options() {
        for op in Operation::ALL {
            for key in ["input", "output", "options"] {
                assert!(!op.spec().recognizes(key));
            }
        }
    }
}
