//! The per-call configuration handed to an NCO operator.
//!
//! A [`Request`] holds the input file(s), the optional output file, the named
//! options and an optional raw options string. Named options are validated against
//! the operator's registry entry when the request is synthesized; the raw string is
//! passed through unchecked.

use std::fmt;

/// Input file(s) of an operator.
///
/// A single input is passed through untouched, so it may be a glob pattern or a
/// remote URI. A sequence is expanded to one argument per element in the given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Single(String),
    Many(Vec<String>),
}

impl Input {
    pub fn paths(&self) -> &[String] {
        match self {
            Input::Single(path) => std::slice::from_ref(path),
            Input::Many(paths) => paths,
        }
    }
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Input::Single(path.to_string())
    }
}

impl From<String> for Input {
    fn from(path: String) -> Self {
        Input::Single(path)
    }
}

impl From<Vec<String>> for Input {
    fn from(paths: Vec<String>) -> Self {
        Input::Many(paths)
    }
}

impl From<Vec<&str>> for Input {
    fn from(paths: Vec<&str>) -> Self {
        Input::Many(paths.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Input {
    fn from(paths: &[&str]) -> Self {
        Input::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Input {
    fn from(paths: [&str; N]) -> Self {
        Input::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Value of a named option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// Repeats a valued flag once per element, e.g. several `-d` clauses.
    List(Vec<String>),
}

impl OptionValue {
    /// Whether a switch given this value should be emitted.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(n) => *n != 0,
            OptionValue::Text(s) => !s.is_empty(),
            OptionValue::List(v) => !v.is_empty(),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n.into())
    }
}

impl From<u32> for OptionValue {
    fn from(n: u32) -> Self {
        OptionValue::Int(n.into())
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::List(v)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(v: Vec<&str>) -> Self {
        OptionValue::List(v.into_iter().map(String::from).collect())
    }
}

impl From<FileFormat> for OptionValue {
    fn from(f: FileFormat) -> Self {
        OptionValue::Text(f.as_str().to_string())
    }
}

/// netCDF output flavours understood by `--fl_fmt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Classic,
    Offset64Bit,
    Netcdf4Classic,
    Netcdf4,
}

impl FileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Classic => "classic",
            FileFormat::Offset64Bit => "64bit",
            FileFormat::Netcdf4Classic => "netcdf4_classic",
            FileFormat::Netcdf4 => "netcdf4",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one operator call needs besides the operator itself.
///
/// ```
/// use nco_commands::{FileFormat, Request};
///
/// let request = Request::new("in.nc")
///     .output("out.nc")
///     .fl_fmt(FileFormat::Netcdf4)
///     .raw("-G :");
/// assert_eq!(request.get("fl_fmt").map(|v| v.is_truthy()), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub(crate) input: Input,
    pub(crate) output: Option<String>,
    pub(crate) values: Vec<(String, OptionValue)>,
    pub(crate) raw: Option<String>,
}

impl Request {
    pub fn new(input: impl Into<Input>) -> Self {
        Self {
            input: input.into(),
            output: None,
            values: Vec::new(),
            raw: None,
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Sets the output file. Operators that only read (e.g. `ncks -M`) can omit it.
    pub fn output(mut self, path: impl Into<String>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Raw options appended verbatim after the named options.
    ///
    /// The string is split like a shell word list but is otherwise unchecked. It is
    /// the only way to pass flags this crate has no key for. Nothing is deduplicated
    /// against named options: if both carry the same flag, both reach the tool.
    pub fn raw(mut self, options: impl Into<String>) -> Self {
        self.raw = Some(options.into());
        self
    }

    /// Sets a named option. Setting a key again replaces its value.
    ///
    /// Keys are checked against the operator's registry entry only when the request
    /// is synthesized.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, key: String, value: OptionValue) {
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
    }

    pub fn overwrite(self) -> Self {
        self.set("overwrite", true)
    }

    pub fn append(self) -> Self {
        self.set("append", true)
    }

    pub fn no_tmp_fl(self) -> Self {
        self.set("no_tmp_fl", true)
    }

    pub fn wrt_tmp_fl(self) -> Self {
        self.set("wrt_tmp_fl", true)
    }

    pub fn create_ram(self) -> Self {
        self.set("create_ram", true)
    }

    pub fn open_ram(self) -> Self {
        self.set("open_ram", true)
    }

    pub fn fl_fmt(self, format: FileFormat) -> Self {
        self.set("fl_fmt", format)
    }

    pub fn hdf4(self) -> Self {
        self.set("hdf4", true)
    }

    /// Directory the tool prepends to relative input names (`-p`).
    pub fn path(self, dir: impl Into<String>) -> Self {
        self.set("path", OptionValue::Text(dir.into()))
    }

    pub fn dbg_lvl(self, level: u32) -> Self {
        self.set("dbg_lvl", level)
    }

    /// Leave the `history` attribute alone (`-h`).
    pub fn history(self) -> Self {
        self.set("history", true)
    }

    /// Number of OpenMP threads the tool may use (`-t`).
    pub fn threads(self, count: u32) -> Self {
        self.set("threads", count)
    }

    /// Interpret hyperslab indices with 1-based Fortran conventions (`-F`).
    pub fn fortran(self) -> Self {
        self.set("fortran", true)
    }

    /// One hyperslab clause, e.g. `"time,5,7"` or `"lon,0.0,90.0,2"`.
    pub fn dimension(self, hyperslab: impl Into<String>) -> Self {
        self.set("dimension", OptionValue::Text(hyperslab.into()))
    }

    /// Several hyperslab clauses, emitted as repeated `-d` flags in order.
    pub fn dimensions<I, S>(self, hyperslabs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let clauses: Vec<String> = hyperslabs.into_iter().map(Into::into).collect();
        self.set("dimension", clauses)
    }

    pub fn variable(self, names: impl Into<String>) -> Self {
        self.set("variable", OptionValue::Text(names.into()))
    }

    /// Invert the `variable` selection (`-x`).
    pub fn exclude(self) -> Self {
        self.set("exclude", true)
    }

    /// Input file name template expansion, e.g. `"5,2,1"` (`-n`).
    pub fn nintap(self, spec: impl Into<String>) -> Self {
        self.set("nintap", OptionValue::Text(spec.into()))
    }

    pub fn fix_rec_dmn(self, dim: impl Into<String>) -> Self {
        self.set("fix_rec_dmn", OptionValue::Text(dim.into()))
    }

    /// Print global metadata only (`ncks -M`).
    pub fn metadata(self) -> Self {
        self.set("metadata", true)
    }

    pub fn rec_apn(self) -> Self {
        self.set("rec_apn", true)
    }

    /// Multi-record output (`--mro`).
    pub fn mro(self) -> Self {
        self.set("mro", true)
    }

    pub fn arrange(self, dims: impl Into<String>) -> Self {
        self.set("arrange", OptionValue::Text(dims.into()))
    }

    /// Packing policy for `ncpdq`, e.g. `"all_new"` or `"upk"` (`-P`).
    pub fn pack_policy(self, policy: impl Into<String>) -> Self {
        self.set("pack_policy", OptionValue::Text(policy.into()))
    }

    /// Name of the new record dimension `ncecat` creates (`-u`).
    pub fn record_name(self, name: impl Into<String>) -> Self {
        self.set("record_name", OptionValue::Text(name.into()))
    }

    /// Dimensions `ncwa` averages over (`-a`).
    pub fn average(self, dims: impl Into<String>) -> Self {
        self.set("average", OptionValue::Text(dims.into()))
    }

    pub fn weight(self, variable: impl Into<String>) -> Self {
        self.set("weight", OptionValue::Text(variable.into()))
    }

    /// Binary operation for `ncbo`: `add`, `sbt`, `mlt` or `dvd`.
    pub fn op_typ(self, operation: impl Into<String>) -> Self {
        self.set("op_typ", OptionValue::Text(operation.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_conversions_keep_order() {
        let from_array: Input = ["85.nc", "86.nc", "87.nc"].into();
        let from_vec: Input = vec!["85.nc".to_string(), "86.nc".to_string(), "87.nc".to_string()].into();
        assert_eq!(from_array, from_vec);
        assert_eq!(from_array.paths(), ["85.nc", "86.nc", "87.nc"]);

        let single: Input = "8[56789].nc".into();
        assert_eq!(single.paths(), ["8[56789].nc"]);
    }

    #[test]
    fn test_truthiness() {
        assert!(OptionValue::Bool(true).is_truthy());
        assert!(!OptionValue::Bool(false).is_truthy());
        assert!(!OptionValue::Int(0).is_truthy());
        assert!(OptionValue::Int(3).is_truthy());
        assert!(!OptionValue::Text(String::new()).is_truthy());
        assert!(OptionValue::Text("all".to_string()).is_truthy());
        assert!(!OptionValue::List(Vec::new()).is_truthy());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let request = Request::new("in.nc")
            .set("dbg_lvl", 1)
            .set("overwrite", true)
            .set("dbg_lvl", 3);

        let keys: Vec<&str> = request.values().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["dbg_lvl", "overwrite"]);
        assert_eq!(request.get("dbg_lvl"), Some(&OptionValue::Int(3)));
    }

    #[test]
    fn test_builders_use_registry_keys() {
        let request = Request::new("in.nc")
            .output("out.nc")
            .fortran()
            .dimension("lon,1,2")
            .fl_fmt(FileFormat::Netcdf4Classic);

        assert_eq!(request.get("fortran"), Some(&OptionValue::Bool(true)));
        assert_eq!(request.get("dimension"), Some(&OptionValue::Text("lon,1,2".to_string())));
        assert_eq!(
            request.get("fl_fmt"),
            Some(&OptionValue::Text("netcdf4_classic".to_string()))
        );
        assert_eq!(request.output.as_deref(), Some("out.nc"));
    }

    #[test]
    fn test_dimensions_builds_list() {
        let request = Request::new("in.nc").dimensions(["lon,0,4", "lon,2,9,2"]);
        assert_eq!(
            request.get("dimension"),
            Some(&OptionValue::List(vec!["lon,0,4".to_string(), "lon,2,9,2".to_string()]))
        );
    }

    #[test]
    fn test_operator_specific_builders() {
        let request = Request::new(["a.nc", "b.nc"])
            .history()
            .threads(4)
            .metadata()
            .pack_policy("all_new")
            .record_name("member")
            .average("lat,lon")
            .weight("gw")
            .op_typ("sbt");

        let text = |s: &str| Some(OptionValue::Text(s.to_string()));
        assert_eq!(request.get("history"), Some(&OptionValue::Bool(true)));
        assert_eq!(request.get("threads"), Some(&OptionValue::Int(4)));
        assert_eq!(request.get("metadata"), Some(&OptionValue::Bool(true)));
        assert_eq!(request.get("pack_policy").cloned(), text("all_new"));
        assert_eq!(request.get("record_name").cloned(), text("member"));
        assert_eq!(request.get("average").cloned(), text("lat,lon"));
        assert_eq!(request.get("weight").cloned(), text("gw"));
        assert_eq!(request.get("op_typ").cloned(), text("sbt"));
    }
}
