use crate::app::App;
use crate::render;
use clap::{Args, ValueEnum};
use organbank_core::forms::{self, DonorWizard, WizardStep};
use organbank_sdk::objects::Gender;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
    Other,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Other => Gender::Other,
        }
    }
}

#[derive(Debug, Args)]
pub struct RegisterDonorArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: String,
    #[arg(long, value_enum)]
    gender: GenderArg,
    /// Ten digits; separators are ignored.
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    /// Organ to pledge; repeat for several.
    #[arg(long = "organ", required = true)]
    organs: Vec<String>,
}

/// Walk the donor wizard with the given answers and register the donor.
pub async fn run(app: &App, args: RegisterDonorArgs) -> anyhow::Result<()> {
    let offered = forms::valid_organs(app.gateway.as_ref()).await;
    let mut wizard = DonorWizard::new();

    loop {
        tracing::debug!(
            step = wizard.step().number(),
            of = WizardStep::ALL.len(),
            "Donor wizard step"
        );
        match wizard.step() {
            WizardStep::Name => wizard.set_name(&args.name),
            WizardStep::Age => wizard.set_age(&args.age)?,
            WizardStep::Gender => wizard.set_gender(args.gender.into()),
            WizardStep::Phone => wizard.set_phone(&args.phone)?,
            WizardStep::Address => wizard.set_address(&args.address),
            WizardStep::Organs => add_organs(&mut wizard, &args.organs, &offered),
        }
        if wizard.is_last_step() {
            break;
        }
        wizard.next()?;
    }
    let registration = wizard.finish()?;

    app.registry.initialize().await;
    let registry_link = app.registry.attach(&app.bus);
    let donor = forms::submit_donor(app.gateway.as_ref(), &app.bus, registration).await?;
    registry_link.unsubscribe();
    app.registry.refresh().await;

    match donor.and_then(|d| d.id) {
        Some(id) => println!("Donor registered with id {id}."),
        None => println!("Donor registered."),
    }
    print!("{}", render::registry(&app.registry.snapshot()));
    Ok(())
}

fn add_organs(wizard: &mut DonorWizard, organs: &[String], offered: &[String]) {
    for organ in organs {
        if !offered.iter().any(|o| o.eq_ignore_ascii_case(organ)) {
            tracing::warn!(
                organ = %organ,
                still_offered = ?wizard.remaining_organs(offered),
                "Organ is not on the backend's list of valid organs"
            );
        }
        if !wizard.add_organ(organ) {
            tracing::debug!(organ = %organ, "Skipping duplicate organ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_organs_skips_duplicates_and_keeps_unlisted() {
        let offered = vec!["Heart".to_string(), "Kidney".to_string()];
        let mut wizard = DonorWizard::new();
        let organs = ["Kidney", "Kidney", "Cornea"].map(String::from);

        add_organs(&mut wizard, &organs, &offered);
        assert_eq!(wizard.draft().organs, ["Kidney", "Cornea"]);
        assert_eq!(wizard.remaining_organs(&offered), vec!["Heart"]);
    }
}
