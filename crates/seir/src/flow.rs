use contagion_core::Model;

use crate::{
    Compartments, Conditions, Flows, Parameters,
    error::NumericDomainError,
    parameters::{ParameterError, Rates},
};

/// The SEIR flow equations.
///
/// Exposed people become infectious at rate `a = 1 / t_incubation`, and the
/// infectious branch into asymptomatic, mild, severe and fatal courses at
/// rate `gamma = 1 / t_presymptomatic`. Severe and fatal courses pass through
/// a home stage before hospital admission. New exposures follow
///
/// ```text
/// beta * (1 - sd)^2 * (I + I_asymptomatic + (1 - p_self_quarantine) * I_mild) * S
/// ```
///
/// where `sd` is the social-distancing strength, which reduces contacts for
/// both parties of an interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowModel {
    rates: Rates,
}

impl FlowModel {
    /// Creates a flow model from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if the parameters fail validation.
    pub fn new(parameters: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self {
            rates: parameters.rates()?,
        })
    }

    #[must_use]
    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    /// New exposures per day.
    #[must_use]
    pub fn force_of_infection(&self, compartments: &Compartments, social_distancing: f64) -> f64 {
        let r = &self.rates;
        let c = compartments;

        let contact = (1.0 - social_distancing).powi(2);
        let infectious = c.infectious + c.asymptomatic + (1.0 - r.p_self_quarantine) * c.mild;

        r.beta * contact * infectious * c.susceptible
    }

    /// Per-day flow of every compartment.
    #[must_use]
    pub fn flows(&self, compartments: &Compartments, social_distancing: f64) -> Flows {
        let r = &self.rates;
        let c = compartments;

        let exposure = self.force_of_infection(c, social_distancing);
        let onset = r.incubation * c.exposed;
        let branching = r.presymptomatic * c.infectious;

        let asymptomatic_recovery = r.recovery_asymptomatic * c.asymptomatic;
        let mild_recovery = r.recovery_mild * c.mild;
        let severe_admission = r.hospital_admission * c.severe_home;
        let severe_recovery = r.recovery_severe * c.severe_hospital;
        let fatal_admission = r.hospital_admission * c.fatal_home;
        let death = r.death * c.fatal_hospital;

        Flows(Compartments {
            susceptible: -exposure,
            exposed: exposure - onset,
            infectious: onset - branching,
            asymptomatic: r.p_asymptomatic * branching - asymptomatic_recovery,
            mild: r.p_mild * branching - mild_recovery,
            severe_home: r.p_severe * branching - severe_admission,
            severe_hospital: severe_admission - severe_recovery,
            fatal_home: r.p_fatal * branching - fatal_admission,
            fatal_hospital: fatal_admission - death,
            recovered_asymptomatic: asymptomatic_recovery,
            recovered_mild: mild_recovery,
            recovered_severe: severe_recovery,
            dead: death,
        })
    }
}

impl Model for FlowModel {
    type Input = Conditions;
    type Output = Flows;
    type Error = NumericDomainError;

    fn call(&self, input: &Conditions) -> Result<Flows, NumericDomainError> {
        let flows = self.flows(&input.compartments, input.social_distancing);

        match flows.first_non_finite() {
            Some(compartment) => Err(NumericDomainError {
                step: input.step,
                compartment,
                value: flows.get(compartment),
            }),
            None => Ok(flows),
        }
    }
}
