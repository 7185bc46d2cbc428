//! Multi-step donor registration wizard.

use super::FormError;
use organbank_sdk::objects::{DonorRegistration, Gender};

/// Youngest age accepted for a donor.
pub const MINIMUM_DONOR_AGE: u32 = 18;
/// Exact length of a donor phone number.
pub const PHONE_DIGITS: usize = 10;

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Name,
    Age,
    Gender,
    Phone,
    Address,
    Organs,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Name,
        WizardStep::Age,
        WizardStep::Gender,
        WizardStep::Phone,
        WizardStep::Address,
        WizardStep::Organs,
    ];

    /// 1-based position, for "step 3 of 6" displays.
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.number()).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.number().checked_sub(2).and_then(|i| Self::ALL.get(i)).copied()
    }
}

/// Everything entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorDraft {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub phone_number: String,
    pub address: String,
    /// Pledged organs in selection order, without duplicates.
    pub organs: Vec<String>,
}

impl DonorDraft {
    fn check(&self, step: WizardStep) -> Result<(), FormError> {
        match step {
            WizardStep::Name if self.name.trim().is_empty() => Err(FormError::Missing("name")),
            WizardStep::Age => match self.age {
                None => Err(FormError::Missing("age")),
                Some(age) if age < MINIMUM_DONOR_AGE => Err(FormError::Underage),
                Some(_) => Ok(()),
            },
            WizardStep::Gender if self.gender.is_none() => Err(FormError::Missing("gender")),
            WizardStep::Phone if self.phone_number.len() != PHONE_DIGITS => {
                Err(FormError::InvalidPhone)
            }
            WizardStep::Address if self.address.trim().is_empty() => {
                Err(FormError::Missing("address"))
            }
            WizardStep::Organs if self.organs.is_empty() => Err(FormError::NoOrgans),
            _ => Ok(()),
        }
    }
}

/// Donor registration as an explicit sequence of steps.
///
/// `next` only moves forward when the current step validates; `back` is
/// always allowed. [`finish`](DonorWizard::finish) re-validates every step.
#[derive(Debug, Clone)]
pub struct DonorWizard {
    step: WizardStep,
    draft: DonorDraft,
}

impl Default for DonorWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl DonorWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Name,
            draft: DonorDraft::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &DonorDraft {
        &self.draft
    }

    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
    }

    pub fn set_name(&mut self, name: &str) {
        self.draft.name = name.to_string();
    }

    /// Parse and store an age. The value is stored even when it is under
    /// the minimum; the error tells the caller to warn right away.
    pub fn set_age(&mut self, input: &str) -> Result<(), FormError> {
        let age: u32 = input
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidAge(input.to_string()))?;
        self.draft.age = Some(age);
        if age < MINIMUM_DONOR_AGE {
            return Err(FormError::Underage);
        }
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.draft.gender = Some(gender);
    }

    /// Keep only digits, at most [`PHONE_DIGITS`] of them.
    ///
    /// Errors while a partial number has been entered.
    pub fn set_phone(&mut self, input: &str) -> Result<(), FormError> {
        self.draft.phone_number = input
            .chars()
            .filter(char::is_ascii_digit)
            .take(PHONE_DIGITS)
            .collect();
        match self.draft.phone_number.len() {
            0 | PHONE_DIGITS => Ok(()),
            _ => Err(FormError::InvalidPhone),
        }
    }

    pub fn set_address(&mut self, address: &str) {
        self.draft.address = address.to_string();
    }

    /// Add an organ to the pledge. Returns `false` for blanks and organs
    /// already selected.
    pub fn add_organ(&mut self, organ: &str) -> bool {
        let organ = organ.trim();
        if organ.is_empty() || self.draft.organs.iter().any(|o| o == organ) {
            return false;
        }
        self.draft.organs.push(organ.to_string());
        true
    }

    pub fn remove_organ(&mut self, organ: &str) -> bool {
        let before = self.draft.organs.len();
        self.draft.organs.retain(|o| o != organ);
        self.draft.organs.len() != before
    }

    /// Organs from `offered` not selected yet.
    pub fn remaining_organs<'a>(&self, offered: &'a [String]) -> Vec<&'a str> {
        offered
            .iter()
            .filter(|o| !self.draft.organs.contains(o))
            .map(String::as_str)
            .collect()
    }

    /// Validate the current step and advance. On the last step this only
    /// validates.
    pub fn next(&mut self) -> Result<WizardStep, FormError> {
        self.draft.check(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Validate every step and build the registration body.
    pub fn finish(&self) -> Result<DonorRegistration, FormError> {
        for step in WizardStep::ALL {
            self.draft.check(step)?;
        }
        let (Some(age), Some(gender)) = (self.draft.age, self.draft.gender) else {
            return Err(FormError::Missing("age and gender"));
        };
        Ok(DonorRegistration {
            name: self.draft.name.trim().to_string(),
            age,
            gender,
            phone_number: self.draft.phone_number.clone(),
            address: self.draft.address.trim().to_string(),
            organs: self.draft.organs.clone(),
        })
    }
}
