use crate::infra::InMemorySessionRepository;
use clap::Args;
use medicost::config::AppConfig;
use medicost::error::AppError;
use medicost::questionnaire::forms::{
    FamilyForm, FormSubmission, MeasurementForm, SwitchForm, UserForm,
};
use medicost::questionnaire::recommendation::{FamilyRecommendation, SwitchRecommendation};
use medicost::questionnaire::tools::{CalculatorInput, CostBreakdown};
use medicost::questionnaire::{
    BackNavigation, BodyMeasurement, ExperienceLevel, IncomeBracket, Intent, NavigationEvent,
    PlanCatalog, QuestionnaireService, QuestionnaireServiceError, Recommendation,
    RecommendationEngine, RecommendationOutcome, SessionView, SmokingStatus, Tool, UsState,
    UserProfile, ValidationError,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Age in years (18-100)
    #[arg(long)]
    pub(crate) age: u8,
    /// Currently smokes
    #[arg(long)]
    pub(crate) smoker: bool,
    /// Number of dependent children
    #[arg(long, default_value_t = 0)]
    pub(crate) children: u8,
    /// State of residence, e.g. "New York" or new_york
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Income bracket label, e.g. "$50,000-75,000"
    #[arg(long)]
    pub(crate) income: Option<String>,
    /// Height in feet (imperial)
    #[arg(long, requires = "weight_lbs", conflicts_with_all = ["height_m", "weight_kg"])]
    pub(crate) height_feet: Option<f64>,
    /// Additional inches of height (imperial)
    #[arg(long, requires = "height_feet")]
    pub(crate) height_inches: Option<f64>,
    /// Weight in pounds (imperial)
    #[arg(long, requires = "height_feet")]
    pub(crate) weight_lbs: Option<f64>,
    /// Height in metres (metric)
    #[arg(long, requires = "weight_kg")]
    pub(crate) height_m: Option<f64>,
    /// Weight in kilograms (metric)
    #[arg(long, requires = "height_m")]
    pub(crate) weight_kg: Option<f64>,
    /// Print the recommendation as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl RecommendArgs {
    fn measurement(&self) -> Result<Option<BodyMeasurement>, ValidationError> {
        match (self.height_feet, self.weight_lbs, self.height_m, self.weight_kg) {
            (Some(feet), Some(pounds), _, _) => {
                BodyMeasurement::imperial(feet, self.height_inches.unwrap_or(0.0), pounds).map(Some)
            }
            (_, _, Some(metres), Some(kilograms)) => {
                BodyMeasurement::metric(metres, kilograms).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn profile(&self) -> Result<UserProfile, ValidationError> {
        let state = self
            .state
            .as_deref()
            .map(str::parse::<UsState>)
            .transpose()?;
        let income_bracket = self
            .income
            .as_deref()
            .map(str::parse::<IncomeBracket>)
            .transpose()?;
        let smoking = if self.smoker {
            SmokingStatus::CurrentSmoker
        } else {
            SmokingStatus::NonSmoker
        };

        Ok(UserProfile {
            age: Some(self.age),
            smoking: Some(smoking),
            children: Some(self.children),
            state,
            income_bracket,
            body: self.measurement()?,
            ..UserProfile::default()
        })
    }
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Pop a per-session history trail on back instead of the parent table
    #[arg(long)]
    pub(crate) history: bool,
    /// Current monthly premium used on the switching path
    #[arg(long, default_value_t = 520)]
    pub(crate) current_premium: u32,
    /// Skip the family portion of the demo
    #[arg(long)]
    pub(crate) skip_family: bool,
}

fn load_catalog() -> Result<Arc<PlanCatalog>, AppError> {
    let config = AppConfig::load()?;
    Ok(Arc::new(config.questionnaire.load_catalog()?))
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let profile = args
        .profile()
        .map_err(QuestionnaireServiceError::Validation)?;
    let engine = RecommendationEngine::new(load_catalog()?);
    let recommendation = engine
        .recommend(&profile)
        .map_err(QuestionnaireServiceError::from)?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&recommendation).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_recommendation(&recommendation);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        history,
        current_premium,
        skip_family,
    } = args;

    let back_navigation = if history {
        BackNavigation::History
    } else {
        BackNavigation::ParentTable
    };
    let repository = Arc::new(InMemorySessionRepository::default());
    let service = QuestionnaireService::with_back_navigation(
        repository.clone(),
        load_catalog()?,
        back_navigation,
    );

    println!("Insurance questionnaire demo ({back_navigation:?} back navigation)");
    let session = service.start()?;
    let id = session.id.clone();
    render_view(&session.view());

    for event in [
        NavigationEvent::ChooseIntent {
            intent: Intent::Explore,
        },
        NavigationEvent::ChooseExperience {
            level: ExperienceLevel::Intermediate,
        },
    ] {
        let session = service.navigate(&id, &event)?;
        render_view(&session.view());
    }

    let session = service.submit(&id, &FormSubmission::User(demo_user_form()))?;
    render_view(&session.view());
    render_outcome(service.recommendation(&id)?);

    println!("\nStepping back to revise answers");
    let session = service.navigate(&id, &NavigationEvent::Back)?;
    render_view(&session.view());

    println!("\nSwitching path");
    for event in [
        NavigationEvent::ReturnHome,
        NavigationEvent::ChooseIntent {
            intent: Intent::Explore,
        },
        NavigationEvent::ChooseExperience {
            level: ExperienceLevel::Switching,
        },
    ] {
        service.navigate(&id, &event)?;
    }
    let session = service.submit(&id, &demo_switch_form(current_premium))?;
    render_view(&session.view());
    render_outcome(service.recommendation(&id)?);

    if !skip_family {
        println!("\nFamily path");
        service.navigate(&id, &NavigationEvent::ReturnHome)?;
        service.navigate(
            &id,
            &NavigationEvent::ChooseIntent {
                intent: Intent::Family,
            },
        )?;
        let session = service.submit(&id, &demo_family_form())?;
        render_view(&session.view());
        render_outcome(service.recommendation(&id)?);
    }

    println!("\nCost calculator (default inputs)");
    let session = service.navigate(
        &id,
        &NavigationEvent::OpenTool {
            tool: Tool::Calculator,
        },
    )?;
    render_view(&session.view());
    render_breakdown(&service.calculate(&CalculatorInput::default())?);

    println!("\n{} session(s) stored", repository.len());
    Ok(())
}

fn demo_user_form() -> UserForm {
    UserForm {
        age: 38,
        sex: "Female".to_string(),
        smoking_status: "Non-Smoker".to_string(),
        state: "Colorado".to_string(),
        measurement: MeasurementForm::Metric {
            metres: 1.68,
            kilograms: 64.0,
        },
        children: 2,
        marital_status: "Married".to_string(),
        conditions: vec!["None".to_string()],
        income: "$100,000-150,000".to_string(),
        max_monthly_budget: 600,
    }
}

fn demo_switch_form(monthly_premium: u32) -> FormSubmission {
    FormSubmission::Switch(SwitchForm {
        provider: "Current Carrier".to_string(),
        monthly_premium,
        deductible: 3_000,
        satisfaction: "Unsatisfied".to_string(),
        switch_reasons: vec!["Too Expensive".to_string(), "Limited Network".to_string()],
        priorities: vec!["Lower Costs".to_string(), "Larger Network".to_string()],
    })
}

fn demo_family_form() -> FormSubmission {
    FormSubmission::Family(FamilyForm {
        adults: 2,
        children_ages: vec![4, 9, 13],
        considerations: vec!["Pediatric Care".to_string(), "Orthodontics/Dental".to_string()],
        budget: "$1000-1500".to_string(),
        priority: "Comprehensive Pediatric Care".to_string(),
    })
}

fn render_view(view: &SessionView) {
    let progress = view
        .progress
        .map(|stage| format!(" [{stage}/4]"))
        .unwrap_or_default();
    let next: Vec<String> = view.next_steps.iter().map(ToString::to_string).collect();
    println!("- {} -> {}{} | next: {}", view.session_id, view.step, progress, next.join(", "));
    if let (Some(bmi), Some(category)) = (view.bmi, view.bmi_category) {
        println!("  BMI {:.1} ({})", bmi, category.label());
    }
}

fn render_outcome(outcome: RecommendationOutcome) {
    match outcome {
        RecommendationOutcome::Standard(recommendation) => render_recommendation(&recommendation),
        RecommendationOutcome::Family(family) => render_family(&family),
        RecommendationOutcome::Switch(switch) => render_switch(&switch),
    }
}

fn render_recommendation(recommendation: &Recommendation) {
    println!(
        "\nRecommended tier: {} ({})",
        recommendation.tier.key(),
        recommendation.rationale
    );
    println!("Confidence:");
    for (tier, confidence) in &recommendation.confidence {
        println!("  - {}: {:.0}%", tier.key(), confidence * 100.0);
    }
    let estimate = &recommendation.cost_estimate;
    println!(
        "Estimated annual cost ${:.0} (low ${:.0} | average ${:.0} | high ${:.0})",
        estimate.point, estimate.scenarios.low, estimate.scenarios.average, estimate.scenarios.high
    );
    println!("Plans:");
    for offer in &recommendation.plans {
        println!(
            "  - {} | ${}/mo | deductible ${} | {} | rating {:.1} | ~${:.0}/yr",
            offer.plan.name,
            offer.plan.monthly_premium,
            offer.plan.annual_deductible,
            offer.plan.network,
            offer.plan.rating,
            offer.estimated_annual_total
        );
    }
}

fn render_family(family: &FamilyRecommendation) {
    println!("\nFamily plans for a household of {}", family.household_size);
    for offer in &family.plans {
        println!(
            "  - {} | ${}/mo | ${:.2} per person | ${} per year",
            offer.plan.name,
            offer.plan.monthly_premium,
            offer.per_person_monthly,
            offer.annual_premium
        );
    }
}

fn render_switch(switch: &SwitchRecommendation) {
    println!(
        "\nAlternatives to a ${}/mo plan",
        switch.current_monthly_premium
    );
    if switch.plans.is_empty() {
        println!("  No catalog plan is within 20% of the current premium");
    }
    for offer in &switch.plans {
        println!(
            "  - {} ({}) | ${}/mo | saves ${}/mo",
            offer.plan.name,
            offer.tier.key(),
            offer.plan.monthly_premium,
            offer.monthly_savings
        );
    }
}

fn render_breakdown(breakdown: &CostBreakdown) {
    println!("- Annual premium ${}", breakdown.annual_premium);
    println!(
        "- Medical costs ${} (copays ${} | prescriptions ${} | emergency ${})",
        breakdown.total_medical_costs,
        breakdown.copay_costs,
        breakdown.prescription_costs,
        breakdown.emergency_estimate
    );
    println!("- Out of pocket ${:.2}", breakdown.out_of_pocket);
    println!(
        "- Total ${:.2} per year (${:.2} per month)",
        breakdown.total_annual_cost, breakdown.monthly_total
    );
}
