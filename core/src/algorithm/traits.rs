//! Engine trait definitions and typed parameter descriptors
//!
//! Engines come in two flavours. A [`ContinuousModel`] recomputes its whole
//! derived output from the current input on every call and holds no hidden
//! progress, so repeated calls with unchanged input yield identical output.
//! A [`SteppedAlgorithm`] advances through discrete user-visible phases and
//! stops in a terminal phase.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};

/// Lab parameter with strongly typed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub constraints: Option<ParameterConstraints>,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Float,
    Boolean,
    Enum(Vec<String>),
}

/// Parameter constraints for validating host input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed_values: Option<Vec<String>>,
}

impl LabParameter {
    pub fn integer(name: &str, value: i64, min: i64, max: i64) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_string(),
            value_type: ParameterType::Integer,
            constraints: Some(ParameterConstraints {
                min: Some(min as f64),
                max: Some(max as f64),
                allowed_values: None,
            }),
        }
    }

    pub fn float(name: &str, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_owned(),
            value: format_float(value),
            value_type: ParameterType::Float,
            constraints: Some(ParameterConstraints {
                min: Some(min),
                max: Some(max),
                allowed_values: None,
            }),
        }
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_string(),
            value_type: ParameterType::Boolean,
            constraints: None,
        }
    }

    pub fn choice(name: &str, value: &str, allowed: &[&str]) -> Self {
        let allowed: Vec<String> = allowed.iter().map(|s| (*s).to_owned()).collect();
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            value_type: ParameterType::Enum(allowed.clone()),
            constraints: Some(ParameterConstraints {
                min: None,
                max: None,
                allowed_values: Some(allowed),
            }),
        }
    }

    /// Validates and parses a host value for an integer parameter
    pub fn parse_integer(&self, raw: &str) -> LabResult<i64> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| LabError::invalid_parameter(&self.name, format!("'{raw}' is not an integer")))?;
        self.check_range(value as f64)?;
        Ok(value)
    }

    /// Validates and parses a host value for a float parameter
    pub fn parse_float(&self, raw: &str) -> LabResult<f64> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| LabError::invalid_parameter(&self.name, format!("'{raw}' is not a number")))?;
        if !value.is_finite() {
            return Err(LabError::invalid_parameter(&self.name, "value must be finite"));
        }
        self.check_range(value)?;
        Ok(value)
    }

    pub fn parse_boolean(&self, raw: &str) -> LabResult<bool> {
        match raw.trim() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" => Ok(false),
            other => Err(LabError::invalid_parameter(&self.name, format!("'{other}' is not a boolean"))),
        }
    }

    /// Returns the matching allowed value
    pub fn parse_choice<'a>(&'a self, raw: &str) -> LabResult<&'a str> {
        let allowed = self
            .constraints
            .as_ref()
            .and_then(|c| c.allowed_values.as_ref())
            .ok_or_else(|| LabError::invalid_parameter(&self.name, "parameter has no choices"))?;
        allowed
            .iter()
            .find(|candidate| candidate.as_str() == raw.trim())
            .map(String::as_str)
            .ok_or_else(|| {
                LabError::invalid_parameter(
                    &self.name,
                    format!("'{raw}' is not one of {}", allowed.join(", ")),
                )
            })
    }

    fn check_range(&self, value: f64) -> LabResult<()> {
        if let Some(constraints) = &self.constraints {
            if let Some(min) = constraints.min {
                if value < min {
                    return Err(LabError::invalid_parameter(
                        &self.name,
                        format!("{value} is below the minimum {min}"),
                    ));
                }
            }
            if let Some(max) = constraints.max {
                if value > max {
                    return Err(LabError::invalid_parameter(
                        &self.name,
                        format!("{value} is above the maximum {max}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn format_float(value: f64) -> String {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Finds the descriptor for `name` in a parameter list
pub fn find_parameter<'a>(parameters: &'a [LabParameter], name: &str) -> LabResult<&'a LabParameter> {
    parameters
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| LabError::invalid_parameter(name, "unknown parameter"))
}

/// Engine whose output is a pure function of its input and settings
pub trait ContinuousModel {
    type Input: ?Sized;
    type Output: Clone + PartialEq + Debug;

    /// Full recompute of all derived outputs
    fn recompute(&self, input: &Self::Input) -> Self::Output;
}

/// Result of advancing a stepped algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// A transition happened and more may follow
    Advanced,
    /// The algorithm reached its terminal phase with this step
    Finished,
    /// Nothing to do in the current phase
    Idle,
}

/// Engine exposed as discrete, user-triggerable transitions
pub trait SteppedAlgorithm {
    type Input: ?Sized;
    type Phase: Copy + PartialEq + Debug;

    fn phase(&self) -> Self::Phase;

    /// Performs the next natural transition
    fn step(&mut self, input: &mut Self::Input) -> LabResult<StepOutcome>;

    /// No further step can act
    fn is_terminal(&self) -> bool;
}
