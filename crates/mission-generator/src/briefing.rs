//! Briefing assembly from localized strings.
//!
//! Every string comes from the active language; a missing key fails the
//! run instead of leaving a placeholder in the briefing.

use mission_domain::{
    Briefing, Environment, FeatureDefinition, FlightPlan, LanguageDefinition, MissionAirbase,
    MissionObjective, ObjectiveDefinition, ResolvedSettings, UnitDefinition, UnitGroup, UnitSystem,
};
use mission_library::Library;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{GenerationError, Result};

/// Everything the briefing is written from
pub struct BriefingInput<'b> {
    pub library: &'b Library,
    pub language: &'b LanguageDefinition,
    pub unit_system: UnitSystem,
    /// Custom mission name; the localized title is used when absent
    pub mission_name: Option<&'b str>,
    pub objective: &'b ObjectiveDefinition,
    pub objectives: &'b [MissionObjective],
    pub features: &'b [&'b FeatureDefinition],
    pub airbase: &'b MissionAirbase,
    pub flight_plan: &'b FlightPlan,
    pub environment: &'b Environment,
    pub resolved: &'b ResolvedSettings,
    pub player_groups: &'b [&'b UnitGroup],
}

/// Text blocks shared by the plain and HTML renderings
struct Sections {
    date_time: String,
    description_header: String,
    tasks_header: String,
    remarks_header: String,
    package_header: String,
    flight_plan_header: String,
    package: Vec<String>,
    waypoints: Vec<String>,
    total_distance: String,
}

pub fn generate_briefing<R: Rng + ?Sized>(input: &BriefingInput<'_>, rng: &mut R) -> Result<Briefing> {
    let lang = input.language;
    let airbase = input.airbase.name.as_str();
    let first = input
        .objectives
        .first()
        .ok_or_else(|| GenerationError::InvalidTemplate("mission has no objective".to_string()))?;

    let title = match input.mission_name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => lang.format("BriefingTitle", &[("name", first.name.as_str())])?,
    };

    let description_key = input
        .objective
        .description_keys
        .choose(rng)
        .ok_or_else(|| GenerationError::MissingLocalization {
            language: lang.id.clone(),
            key: format!("description of objective '{}'", input.objective.id),
        })?;
    let description = lang.format(
        description_key,
        &[
            ("objective", first.name.as_str()),
            ("location", first.node_name.as_str()),
            ("airbase", airbase),
        ],
    )?;

    let mut remarks = Vec::new();
    for key in &input.objective.remark_keys {
        remarks.push(lang.format(key, &[("airbase", airbase)])?);
    }
    let air_defense_key = format!(
        "RemarkEnemyAirDefense{}",
        input.resolved.enemy_air_defense.as_str()
    );
    remarks.push(lang.get(&air_defense_key)?.to_string());
    let cap_key = format!("RemarkEnemyCap{}", input.resolved.enemy_cap.as_str());
    remarks.push(lang.get(&cap_key)?.to_string());
    for key in input.features.iter().filter_map(|f| f.remark_key.as_ref()) {
        remarks.push(lang.format(key, &[("airbase", airbase)])?);
    }

    let mut tasks = vec![lang.format("TaskTakeoff", &[("airbase", airbase)])?];
    for objective in input.objectives {
        tasks.push(lang.format(
            &input.objective.task_key,
            &[
                ("objective", objective.name.as_str()),
                ("location", objective.node_name.as_str()),
            ],
        )?);
    }
    tasks.push(lang.format("TaskLand", &[("airbase", airbase)])?);

    let sections = sections(input)?;
    let plain_text = render_plain(&title, &description, &remarks, &tasks, &sections);
    let html = render_html(&title, &description, &remarks, &tasks, &sections);

    Ok(Briefing {
        title,
        description,
        remarks,
        tasks,
        plain_text,
        html,
    })
}

fn sections(input: &BriefingInput<'_>) -> Result<Sections> {
    let lang = input.language;
    let units = input.unit_system;
    let (hour, minute) = input.environment.start_hour_minute();

    let package = input
        .player_groups
        .iter()
        .map(|group| {
            let definition = group
                .units
                .first()
                .and_then(|u| input.library.get::<UnitDefinition>(&u.definition_id));
            let aircraft = definition.map_or("?", |d| d.display_name.as_str());
            let radio = definition
                .and_then(|d| d.aircraft)
                .map(|a| format!(", {:.3} MHz", a.radio_frequency_mhz))
                .unwrap_or_default();
            format!("{}: {}x {aircraft}{radio}", group.name, group.units.len())
        })
        .collect();

    let mut waypoints = Vec::new();
    let mut previous = input.flight_plan.home();
    for waypoint in input.flight_plan.waypoints() {
        waypoints.push(format!(
            "{}: {}, {}",
            waypoint.name,
            units.format_distance(previous.distance_to(&waypoint.coordinates)),
            units.format_altitude(waypoint.altitude_ft)
        ));
        previous = waypoint.coordinates;
    }
    waypoints.push(format!(
        "{}: {}",
        input.airbase.name,
        units.format_distance(previous.distance_to(&input.flight_plan.home()))
    ));

    let date = input.environment.date.format("%Y-%m-%d").to_string();
    let time = format!("{hour:02}:{minute:02}");
    let total = units.format_distance(input.flight_plan.total_distance_m());

    Ok(Sections {
        date_time: lang.format("BriefingDateTime", &[("date", date.as_str()), ("time", time.as_str())])?,
        description_header: lang.get("HeaderDescription")?.to_string(),
        tasks_header: lang.get("HeaderTasks")?.to_string(),
        remarks_header: lang.get("HeaderRemarks")?.to_string(),
        package_header: lang.get("HeaderFlightPackage")?.to_string(),
        flight_plan_header: lang.get("HeaderFlightPlan")?.to_string(),
        package,
        waypoints,
        total_distance: lang.format("BriefingTotalDistance", &[("distance", total.as_str())])?,
    })
}

fn render_plain(
    title: &str,
    description: &str,
    remarks: &[String],
    tasks: &[String],
    s: &Sections,
) -> String {
    let mut lines = vec![title.to_string(), s.date_time.clone(), String::new()];

    let mut section = |header: &str, body: Vec<String>| {
        lines.push(format!("== {header} =="));
        lines.extend(body);
        lines.push(String::new());
    };

    section(&s.description_header, vec![description.to_string()]);
    section(&s.tasks_header, tasks.iter().map(|t| format!("- {t}")).collect());
    section(&s.remarks_header, remarks.iter().map(|r| format!("- {r}")).collect());
    section(&s.package_header, s.package.iter().map(|p| format!("- {p}")).collect());

    let mut plan: Vec<String> = s.waypoints.iter().map(|w| format!("- {w}")).collect();
    plan.push(s.total_distance.clone());
    section(&s.flight_plan_header, plan);

    lines.join("\n").trim_end().to_string()
}

fn render_html(
    title: &str,
    description: &str,
    remarks: &[String],
    tasks: &[String],
    s: &Sections,
) -> String {
    let list = |items: &[String]| {
        let items: String = items
            .iter()
            .map(|i| format!("<li>{}</li>", escape_html(i)))
            .collect();
        format!("<ul>{items}</ul>")
    };

    [
        format!("<h1>{}</h1>", escape_html(title)),
        format!("<p><em>{}</em></p>", escape_html(&s.date_time)),
        format!("<h2>{}</h2>", escape_html(&s.description_header)),
        format!("<p>{}</p>", escape_html(description)),
        format!("<h2>{}</h2>", escape_html(&s.tasks_header)),
        list(tasks),
        format!("<h2>{}</h2>", escape_html(&s.remarks_header)),
        list(remarks),
        format!("<h2>{}</h2>", escape_html(&s.package_header)),
        list(&s.package),
        format!("<h2>{}</h2>", escape_html(&s.flight_plan_header)),
        list(&s.waypoints),
        format!("<p>{}</p>", escape_html(&s.total_distance)),
    ]
    .join("\n")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use mission_domain::{
        Coalition, Coordinates, GroupRole, MissionUnit, MissionWaypoint, ResolvedAmount, Skill,
        WaypointKind,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Fixture {
        library: Library,
        objectives: Vec<MissionObjective>,
        airbase: MissionAirbase,
        flight_plan: FlightPlan,
        environment: Environment,
        resolved: ResolvedSettings,
        player: UnitGroup,
    }

    fn fixture() -> Fixture {
        let objectives = vec![MissionObjective {
            index: 0,
            name: "Hammer".to_string(),
            objective_type: "strike".to_string(),
            node_id: "gori-range".to_string(),
            node_name: "Gori Range".to_string(),
            spawn_point_id: "gori-m1".to_string(),
            coordinates: Coordinates::new(60_000.0, 0.0),
            altitude_hint_ft: 18_000.0,
            group_size_hint: 2,
        }];
        let flight_plan = FlightPlan::new(
            Coordinates::default(),
            vec![MissionWaypoint {
                name: "HAMMER".to_string(),
                coordinates: Coordinates::new(60_000.0, 0.0),
                altitude_ft: 18_000.0,
                kind: WaypointKind::Objective { index: 0 },
            }],
        );
        let mut rng = StdRng::seed_from_u64(1);
        let environment = crate::environment::generate_environment(
            &mission_domain::EnvironmentOptions::default(),
            &test_support::theater(),
            &mut rng,
        );

        Fixture {
            library: test_support::library(),
            objectives,
            airbase: MissionAirbase {
                node_id: "batumi".to_string(),
                name: "Batumi".to_string(),
                coordinates: Coordinates::default(),
                atc_frequency_mhz: Some(131.0),
            },
            flight_plan,
            environment,
            resolved: ResolvedSettings {
                objective_count: 1,
                enemy_air_defense: ResolvedAmount::High,
                enemy_cap: ResolvedAmount::None,
                friendly_air_defense: ResolvedAmount::Low,
                friendly_cap: ResolvedAmount::Low,
                objective_defense: ResolvedAmount::Average,
            },
            player: UnitGroup {
                group_id: 1,
                name: "Enfield 1".to_string(),
                coalition: Coalition::Blue,
                country: "USA".to_string(),
                role: GroupRole::PlayerFlight,
                coordinates: Coordinates::default(),
                destination: None,
                spawn_point_id: None,
                airbase_id: Some("batumi".to_string()),
                altitude_ft: 0.0,
                callsign: None,
                units: vec![MissionUnit {
                    unit_id: 1,
                    name: "Enfield 1-1".to_string(),
                    definition_id: "fa18c".to_string(),
                    type_name: "FA-18C_hornet".to_string(),
                    skill: Skill::Player,
                }],
            },
        }
    }

    fn generate(f: &Fixture, language: &LanguageDefinition) -> Result<Briefing> {
        let objective = f.library.get::<ObjectiveDefinition>("strike").unwrap();
        let player = [&f.player];
        let input = BriefingInput {
            library: &f.library,
            language,
            unit_system: UnitSystem::Imperial,
            mission_name: None,
            objective,
            objectives: &f.objectives,
            features: &[],
            airbase: &f.airbase,
            flight_plan: &f.flight_plan,
            environment: &f.environment,
            resolved: &f.resolved,
            player_groups: &player,
        };
        generate_briefing(&input, &mut StdRng::seed_from_u64(2))
    }

    #[test]
    fn test_briefing_uses_resolved_amounts() {
        let f = fixture();
        let language = f.library.get::<LanguageDefinition>("english").unwrap();
        let briefing = generate(&f, language).unwrap();

        let high = language.get("RemarkEnemyAirDefenseHigh").unwrap();
        let none = language.get("RemarkEnemyCapNone").unwrap();
        assert!(briefing.remarks.iter().any(|r| r == high));
        assert!(briefing.remarks.iter().any(|r| r == none));
    }

    #[test]
    fn test_briefing_title_and_tasks() {
        let f = fixture();
        let language = f.library.get::<LanguageDefinition>("english").unwrap();
        let briefing = generate(&f, language).unwrap();

        assert!(briefing.title.contains("Hammer"));
        assert_eq!(briefing.tasks.len(), 3);
        assert!(briefing.tasks[0].contains("Batumi"));
        assert!(briefing.tasks[2].contains("Batumi"));
        assert!(briefing.plain_text.contains("Enfield 1: 1x"));
        assert!(briefing.html.starts_with("<h1>"));
    }

    #[test]
    fn test_missing_key_fails() {
        let f = fixture();
        let mut language = f.library.get::<LanguageDefinition>("english").unwrap().clone();
        language.strings.remove("TaskLand");

        let err = generate(&f, &language).unwrap_err();
        assert!(matches!(err, GenerationError::MissingLocalization { key, .. } if key == "TaskLand"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
    }
}
