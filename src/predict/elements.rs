use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

/// One name + two-line group, exactly as it appeared in the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSet {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Lazy iterator over the 3-line groups of an elements file.
pub struct ElementSets<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> Iterator for ElementSets<'a> {
    type Item = Result<ElementSet, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        if start >= self.lines.len() {
            return None;
        }
        self.next += 3;
        Some(self.group(start))
    }
}

impl ElementSets<'_> {
    fn group(&self, start: usize) -> Result<ElementSet, PredictError> {
        Ok(ElementSet {
            name: self.slot(start, 0, "name")?,
            line1: self.slot(start, 1, "line 1")?,
            line2: self.slot(start, 2, "line 2")?,
        })
    }

    fn slot(&self, start: usize, offset: usize, slot: &'static str) -> Result<String, PredictError> {
        self.lines
            .get(start + offset)
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .ok_or(PredictError::MissingLine {
                index: start / 3,
                slot,
            })
    }
}

/// Splits an elements file into name/line1/line2 groups.
///
/// Only line terminators are stripped. A line count that is not a multiple
/// of three fails up front; an empty slot fails when its group is reached.
pub fn parse_element_sets(content: &str) -> Result<ElementSets<'_>, PredictError> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() % 3 != 0 {
        return Err(PredictError::LineCount(lines.len()));
    }
    Ok(ElementSets { lines, next: 0 })
}

/// Convenience wrapper collecting every group or failing on the first bad one.
pub fn parse_all(content: &str) -> Result<Vec<ElementSet>, PredictError> {
    parse_element_sets(content)?.collect()
}

/// An element set bound to its SGP4 model.
pub struct Satellite {
    pub set: ElementSet,
    pub elements: Elements,
    pub constants: Constants,
}

impl Satellite {
    pub fn from_set(set: ElementSet) -> Result<Self, PredictError> {
        let invalid = |message: String| PredictError::InvalidTle {
            name: set.name.clone(),
            message,
        };

        let elements = Elements::from_tle(
            Some(set.name.trim().to_string()),
            set.line1.trim_end().as_bytes(),
            set.line2.trim_end().as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;

        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            set,
            elements,
            constants,
        })
    }

    pub fn name(&self) -> &str {
        self.set.name.trim()
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    /// Orbital period in minutes, from the mean motion in revolutions per day.
    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.elements.mean_motion
    }
}
