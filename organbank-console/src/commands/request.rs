use crate::app::App;
use clap::{Args, ValueEnum};
use organbank_core::forms::{self, HospitalRequestForm};
use organbank_sdk::objects::Urgency;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum UrgencyArg {
    Low,
    #[default]
    Medium,
    High,
}

impl From<UrgencyArg> for Urgency {
    fn from(value: UrgencyArg) -> Self {
        match value {
            UrgencyArg::Low => Urgency::Low,
            UrgencyArg::Medium => Urgency::Medium,
            UrgencyArg::High => Urgency::High,
        }
    }
}

#[derive(Debug, Args)]
pub struct SendRequestArgs {
    #[arg(long)]
    hospital: String,
    #[arg(long)]
    organ: String,
    #[arg(long)]
    patient: String,
    #[arg(long)]
    patient_age: Option<u32>,
    /// One of A+ A- B+ B- AB+ AB- O+ O-.
    #[arg(long)]
    blood_type: Option<String>,
    #[arg(long, value_enum, default_value_t)]
    urgency: UrgencyArg,
    #[arg(long, default_value = "")]
    contact: String,
}

pub async fn run(app: &App, args: SendRequestArgs) -> anyhow::Result<()> {
    let mut form = HospitalRequestForm {
        hospital_name: args.hospital,
        organ_type: args.organ,
        urgency: args.urgency.into(),
        patient_name: args.patient,
        patient_age: args.patient_age,
        contact_number: args.contact,
        ..Default::default()
    };
    if let Some(label) = args.blood_type {
        form.set_blood_type(&label)?;
    }
    let request = form.build()?;

    let stored = forms::submit_hospital_request(app.gateway.as_ref(), &app.bus, request).await?;
    match stored.and_then(|r| r.id) {
        Some(id) => println!("Request sent to the organ bank (id {id})."),
        None => println!("Request sent to the organ bank."),
    }
    Ok(())
}
