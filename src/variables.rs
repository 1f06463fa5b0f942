//! The GITM 3DALL variable catalog.
//!
//! GITM writes its output columns under internal codes that embed IDL-style
//! formatting directives (e.g. `[O(!U3!NP)]` for atomic oxygen in the 3P
//! state). Those codes are what appears in the model files, so they are what
//! users pass on the command line; the catalog maps each one to a plain
//! display name used for plot titles and output file paths. The catalog is
//! fixed at build time and is only used for labeling, never for computation.
use std::sync::OnceLock;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error::ConfigError;

static CATALOG: OnceLock<IndexMap<&'static str, &'static str>> = OnceLock::new();

/// All 3DALL variable codes mapped to their display names, in file column order.
pub fn catalog() -> &'static IndexMap<&'static str, &'static str> {
    CATALOG.get_or_init(|| {
        IndexMap::from([
            ("Rho", "Total Neutral Density"),
            ("[O(!U3!NP)]", "O(3P)"),
            ("[O!D2!N]", "O2"),
            ("[N!D2!N]", "N2"),
            ("[N(!U4!NS)]", "N(4S)"),
            ("[NO]", "NO"),
            ("[He]", "He"),
            ("[N(!U2!ND)]", "N(2D)"),
            ("[N(!U2!NP)]", "N(2P)"),
            ("[H]", "H"),
            ("[CO!D2!N]", "CO2"),
            ("[O(!U1!ND)]", "O(1D)"),
            ("Temperature", "Temperature"),
            ("V!Dn!N(east)", "Vn(east)"),
            ("V!Dn!N(north)", "Vn(north)"),
            ("V!Dn!N(up)", "Vn(up)"),
            ("V!Dn!N(up,O(!U3!NP))", "Vn(up,O(3P))"),
            ("V!Dn!N(up,O!D2!N)", "Vn(up,O2)"),
            ("V!Dn!N(up,N!D2!N)", "Vn(up,N2)"),
            ("V!Dn!N(up,N(!U4!NS))", "Vn(up,N(4S))"),
            ("V!Dn!N(up,NO)", "Vn(up,NO)"),
            ("V!Dn!N(up,He)", "Vn(up,He)"),
            ("[O_4SP_!U+!N]", "O(4Sp)+"),
            ("[NO!U+!N]", "NO+"),
            ("[O!D2!U+!N]", "O2+"),
            ("[N!D2!U+!N]", "N2+"),
            ("[N!U+!N]", "N+"),
            ("[O(!U2!ND)!U+!N]", "O(2D)+"),
            ("[O(!U2!NP)!U+!N]", "O(2P)+"),
            ("[H!U+!N]", "H+"),
            ("[He!U+!N]", "He+"),
            ("[e-]", "e-"),
            ("eTemperature", "eTemperature"),
            ("iTemperature", "iTemperature"),
            ("V!Di!N(east)", "Vi(east)"),
            ("V!Di!N(north)", "Vi(north)"),
            ("V!Di!N(up)", "Vi(up)"),
        ])
    })
}

/// Look up the display name for a 3DALL variable code.
pub fn display_name(code: &str) -> Result<&'static str, ConfigError> {
    catalog()
        .get(code)
        .copied()
        .ok_or_else(|| ConfigError::UnknownVariable {
            code: code.to_string(),
            known: catalog().keys().join(", "),
        })
}

/// The ordered set of variables requested for one run.
///
/// The variable axis of the data arrays is indexed against this set, in the
/// order the codes appear here, so resolving a code to its index here gives
/// the index into axis 1 of the raw and background arrays.
#[derive(Debug, Clone)]
pub struct VariableSet {
    codes: Vec<&'static str>,
}

impl VariableSet {
    /// Every variable in the catalog, in file column order.
    pub fn all() -> Self {
        Self {
            codes: catalog().keys().copied().collect(),
        }
    }

    /// Build the set from user-supplied codes, validating each against the
    /// catalog. Fails fast so a typo is caught before any model file is read.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Result<Self, ConfigError> {
        let mut validated = Vec::with_capacity(codes.len());
        for code in codes {
            let (known_code, _) = catalog().get_key_value(code.as_ref()).ok_or_else(|| {
                ConfigError::UnknownVariable {
                    code: code.as_ref().to_string(),
                    known: catalog().keys().join(", "),
                }
            })?;
            validated.push(*known_code);
        }
        Ok(Self { codes: validated })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codes.iter().copied()
    }

    pub fn resolve_by_name(&self, code: &str) -> Result<usize, ConfigError> {
        self.codes.iter().position(|c| *c == code).ok_or_else(|| {
            ConfigError::UnknownVariable {
                code: code.to_string(),
                known: self.codes.iter().join(", "),
            }
        })
    }

    pub fn resolve_by_index(&self, index: usize) -> Result<&'static str, ConfigError> {
        self.codes
            .get(index)
            .copied()
            .ok_or(ConfigError::VariableIndexOutOfRange {
                index,
                n_vars: self.codes.len(),
            })
    }
}

/// How the caller identifies a variable: by its 3DALL code or by its index
/// into the requested [`VariableSet`].
#[derive(Debug, Clone)]
pub enum VarSelector {
    ByName(String),
    ByIndex(usize),
}

impl VarSelector {
    /// Resolve to an (index, code) pair against the given variable set.
    pub fn resolve(&self, vars: &VariableSet) -> Result<(usize, &'static str), ConfigError> {
        match self {
            VarSelector::ByName(code) => {
                let idx = vars.resolve_by_name(code)?;
                Ok((idx, vars.resolve_by_index(idx)?))
            }
            VarSelector::ByIndex(idx) => Ok((*idx, vars.resolve_by_index(*idx)?)),
        }
    }
}

/// Display name adjusted for plot titles: GITM display names use parentheses,
/// which the original plotting convention swaps for square brackets in titles.
pub fn title_name(code: &str) -> Result<String, ConfigError> {
    Ok(display_name(code)?.replace('(', "[").replace(')', "]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_all_3dall_columns() {
        assert_eq!(catalog().len(), 37);
        assert_eq!(catalog()["Rho"], "Total Neutral Density");
        assert_eq!(catalog()["V!Di!N(up)"], "Vi(up)");
    }

    #[test]
    fn test_unknown_variable_is_a_config_error() {
        let err = VariableSet::from_codes(&["Rho", "NotAVariable"]).unwrap_err();
        match err {
            ConfigError::UnknownVariable { code, .. } => assert_eq!(code, "NotAVariable"),
            other => panic!("Expected UnknownVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_resolution_round_trips() {
        let vars = VariableSet::from_codes(&["Temperature", "[NO]"]).unwrap();
        assert_eq!(vars.resolve_by_name("[NO]").unwrap(), 1);
        assert_eq!(vars.resolve_by_index(0).unwrap(), "Temperature");

        let (idx, code) = VarSelector::ByName("[NO]".to_string())
            .resolve(&vars)
            .unwrap();
        assert_eq!((idx, code), (1, "[NO]"));

        let err = VarSelector::ByIndex(2).resolve(&vars).unwrap_err();
        match err {
            ConfigError::VariableIndexOutOfRange { index, n_vars } => {
                assert_eq!((index, n_vars), (2, 2));
            }
            other => panic!("Expected VariableIndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_title_name_swaps_brackets() {
        assert_eq!(title_name("V!Dn!N(east)").unwrap(), "Vn[east]");
    }
}
