/// How a parameter value is constrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous value in `[min, max]`.
    Range { min: f32, max: f32 },
    /// Whole number in `[min, max]`.
    Integer { min: i32, max: i32 },
    /// Index into a list of option names.
    Options(&'static [&'static str]),
    /// 0 or 1.
    Toggle,
}

/// Declaration of one parameter on a node type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f32,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn range(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            kind: ParamKind::Range { min, max },
        }
    }

    pub const fn integer(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            name,
            default: default as f32,
            kind: ParamKind::Integer { min, max },
        }
    }

    pub const fn options(name: &'static str, default: usize, names: &'static [&'static str]) -> Self {
        Self {
            name,
            default: default as f32,
            kind: ParamKind::Options(names),
        }
    }

    pub const fn toggle(name: &'static str, on: bool) -> Self {
        Self {
            name,
            default: if on { 1.0 } else { 0.0 },
            kind: ParamKind::Toggle,
        }
    }

    /// Bring `value` into this parameter's domain.
    pub fn constrain(&self, value: f32) -> f32 {
        match self.kind {
            ParamKind::Range { min, max } => value.clamp(min, max),
            ParamKind::Integer { min, max } => value.round().clamp(min as f32, max as f32),
            ParamKind::Options(names) => {
                let last = names.len().saturating_sub(1) as f32;
                value.round().clamp(0.0, last)
            }
            ParamKind::Toggle => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Current values for a node's declared parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    specs: &'static [ParamSpec],
    values: Vec<f32>,
}

impl ParamSet {
    pub fn new(specs: &'static [ParamSpec]) -> Self {
        Self {
            specs,
            values: specs.iter().map(|spec| spec.default).collect(),
        }
    }

    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.name == name)
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.index_of(name).map(|i| self.values[i])
    }

    /// Value of `name`, or 0 when the node declares no such parameter.
    #[inline]
    pub fn value(&self, name: &str) -> f32 {
        self.get(name).unwrap_or(0.0)
    }

    /// Integer and option parameters as an index.
    #[inline]
    pub fn index(&self, name: &str) -> usize {
        self.value(name).max(0.0) as usize
    }

    #[inline]
    pub fn flag(&self, name: &str) -> bool {
        self.value(name) >= 0.5
    }

    /// Set `name`, constraining the value. Returns the stored value, or `None`
    /// for an unknown name. Non-finite input leaves the current value in place.
    pub fn set(&mut self, name: &str, value: f32) -> Option<f32> {
        let index = self.index_of(name)?;
        if value.is_finite() {
            self.values[index] = self.specs[index].constrain(value);
        }
        Some(self.values[index])
    }

    pub fn reset(&mut self) {
        for (value, spec) in self.values.iter_mut().zip(self.specs) {
            *value = spec.default;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.specs.iter().map(|spec| spec.name).zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPECS: [ParamSpec; 4] = [
        ParamSpec::range("cutoff", 1_000.0, 20.0, 20_000.0),
        ParamSpec::integer("steps", 8, 1, 8),
        ParamSpec::options("mode", 0, &["lowpass", "highpass"]),
        ParamSpec::toggle("loop", false),
    ];

    #[test]
    fn defaults_are_loaded() {
        let params = ParamSet::new(&SPECS);
        assert_eq!(params.value("cutoff"), 1_000.0);
        assert_eq!(params.index("steps"), 8);
        assert!(!params.flag("loop"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn set_constrains_by_kind() {
        let mut params = ParamSet::new(&SPECS);
        assert_eq!(params.set("cutoff", 1.0e6), Some(20_000.0));
        assert_eq!(params.set("steps", 3.6), Some(4.0));
        assert_eq!(params.set("steps", -2.0), Some(1.0));
        assert_eq!(params.set("mode", 7.0), Some(1.0));
        assert_eq!(params.set("loop", 0.7), Some(1.0));
        assert_eq!(params.set("nope", 1.0), None);
    }

    #[test]
    fn non_finite_is_ignored() {
        let mut params = ParamSet::new(&SPECS);
        assert_eq!(params.set("cutoff", f32::NAN), Some(1_000.0));
        assert_eq!(params.set("cutoff", f32::INFINITY), Some(1_000.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut params = ParamSet::new(&SPECS);
        params.set("cutoff", 50.0);
        params.reset();
        assert_eq!(params.value("cutoff"), 1_000.0);
        assert_eq!(params.iter().count(), 4);
    }
}
