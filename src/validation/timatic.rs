/// Answers whether travellers of a nationality need a visa.
pub trait VisaRequirementLookup: Send + Sync {
    fn visa_required(&self, nationality: &str) -> bool;
}

/// Placeholder lookup giving the same answer for every nationality.
#[derive(Debug, Clone, Copy)]
pub struct StaticVisaRequirement {
    required: bool,
}

impl StaticVisaRequirement {
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl Default for StaticVisaRequirement {
    fn default() -> Self {
        Self::new(true)
    }
}

impl VisaRequirementLookup for StaticVisaRequirement {
    fn visa_required(&self, _nationality: &str) -> bool {
        self.required
    }
}
