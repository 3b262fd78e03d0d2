//! Variable storage and substitution.
//!
//! Keys always carry the sigil (`$dest`). `$CURRDIR` is owned by the session
//! and tracks the working directory; user variables live for the process only.

use indexmap::IndexMap;
use qfm_types::{FmError, FmResult};
use std::path::Path;

pub const SIGIL: char = '$';
pub const CURRDIR: &str = "$CURRDIR";

#[derive(Debug, Clone)]
pub struct VariableStore {
    variables: IndexMap<String, String>,
}

impl VariableStore {
    pub fn new(working_dir: &Path) -> Self {
        let mut variables = IndexMap::new();
        variables.insert(CURRDIR.to_string(), working_dir.display().to_string());
        VariableStore { variables }
    }

    /// Define or overwrite a user variable. `name` is given without the sigil.
    pub fn set(&mut self, name: &str, value: &str) -> FmResult<()> {
        let name = name.trim();
        if name.contains(SIGIL) {
            return Err(FmError::VariableNameConflict(name.to_string()));
        }
        if name.is_empty() {
            return Err(FmError::MissingArgument {
                command: "variable".to_string(),
            });
        }
        let key = format!("{SIGIL}{name}");
        if key == CURRDIR {
            return Err(FmError::ReservedVariable(key));
        }
        self.variables.insert(key, value.to_string());
        Ok(())
    }

    pub(crate) fn set_working_dir(&mut self, path: &Path) {
        self.variables
            .insert(CURRDIR.to_string(), path.display().to_string());
    }

    /// Look up a variable by its sigil-prefixed key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// Keys in definition order, `$CURRDIR` first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replace every known `$NAME` in `input` with its value.
    ///
    /// A single left-to-right pass: substituted text is never rescanned, and
    /// when several keys match at one position the longest wins. Unknown
    /// tokens are left as typed.
    pub fn substitute(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(pos) = rest.find(SIGIL) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            let matched = self
                .variables
                .iter()
                .filter(|(key, _)| tail.starts_with(key.as_str()))
                .max_by_key(|(key, _)| key.len());
            match matched {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &tail[key.len()..];
                }
                None => {
                    out.push(SIGIL);
                    rest = &tail[SIGIL.len_utf8()..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VariableStore {
        VariableStore::new(Path::new("/home/u"))
    }

    #[test]
    fn test_currdir_is_always_present() {
        let vars = store();
        assert_eq!(vars.get(CURRDIR), Some("/home/u"));
        assert_eq!(vars.keys().next(), Some(CURRDIR));
    }

    #[test]
    fn test_set_and_substitute() {
        let mut vars = store();
        vars.set("dest", "/tmp").unwrap();
        assert_eq!(vars.substitute("a.txt::moveto>>$dest"), "a.txt::moveto>>/tmp");
        assert_eq!(vars.substitute("$CURRDIR/x"), "/home/u/x");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let mut vars = store();
        vars.set("A", "$B").unwrap();
        vars.set("B", "x").unwrap();
        assert_eq!(vars.substitute("go $A"), "go $B");
    }

    #[test]
    fn test_longest_key_wins() {
        let mut vars = store();
        vars.set("d", "short").unwrap();
        vars.set("dest", "long").unwrap();
        assert_eq!(vars.substitute("$dest $d"), "long short");
    }

    #[test]
    fn test_unknown_tokens_stay_literal() {
        let vars = store();
        assert_eq!(vars.substitute("cost $5 $nope"), "cost $5 $nope");
    }

    #[test]
    fn test_sigil_in_name_is_rejected() {
        let mut vars = store();
        assert!(matches!(
            vars.set("$bad", "x"),
            Err(FmError::VariableNameConflict(_))
        ));
        assert!(matches!(
            vars.set("CURRDIR", "/"),
            Err(FmError::ReservedVariable(_))
        ));
    }

    #[test]
    fn test_working_dir_tracking() {
        let mut vars = store();
        vars.set_working_dir(Path::new("/var"));
        assert_eq!(vars.get(CURRDIR), Some("/var"));
        assert_eq!(vars.len(), 1);
    }
}
