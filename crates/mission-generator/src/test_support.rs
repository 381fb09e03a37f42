//! Shared fixtures for unit tests: a small Caucasus-like theater and a
//! library with just enough definitions to run every pipeline step.

use mission_domain::{
    CallsignStyle, Coalition, CoalitionDefinition, Coordinates, DaylightWindow, METERS_PER_NM,
    MissionTemplate, NodeCategory, PerCoalition, PerMonth, Precipitation, SpawnPoint,
    SpawnPointType, TheaterDefinition, TheaterNode, ValueRange, WeatherPreset, WindPreset,
};
use mission_library::{DefinitionBundle, Library, LibraryDefaults};
use serde_json::json;

use crate::callsign::CallsignGenerator;
use crate::config::SpawnSearchConfig;
use crate::generator::assign_countries;
use crate::log::GenerationLog;
use crate::run::RunContext;
use crate::units::UnitGroupGenerator;

fn at(x_nm: f64, y_nm: f64) -> Coordinates {
    Coordinates::new(x_nm * METERS_PER_NM, y_nm * METERS_PER_NM)
}

fn point(id: &str, point_type: SpawnPointType, x_nm: f64, y_nm: f64) -> SpawnPoint {
    SpawnPoint {
        id: id.to_string(),
        coordinates: at(x_nm, y_nm),
        point_type,
    }
}

fn airbase(
    id: &str,
    name: &str,
    coalition: Option<Coalition>,
    (x_nm, y_nm): (f64, f64),
    spawn_points: Vec<SpawnPoint>,
) -> TheaterNode {
    TheaterNode {
        id: id.to_string(),
        name: name.to_string(),
        category: NodeCategory::Airbase,
        coordinates: at(x_nm, y_nm),
        default_coalition: coalition,
        atc_frequency_mhz: Some(131.0),
        elevation_ft: 50.0,
        spawn_points,
    }
}

fn location(id: &str, name: &str, (x_nm, y_nm): (f64, f64), spawn_points: Vec<SpawnPoint>) -> TheaterNode {
    TheaterNode {
        id: id.to_string(),
        name: name.to_string(),
        category: NodeCategory::Location,
        coordinates: at(x_nm, y_nm),
        default_coalition: None,
        atc_frequency_mhz: None,
        elevation_ft: 0.0,
        spawn_points,
    }
}

pub fn theater() -> TheaterDefinition {
    use Coalition::{Blue, Red};
    use SpawnPointType::{LandLarge, LandMedium, LandSmall, Sea};

    let nodes = vec![
        airbase(
            "batumi",
            "Batumi",
            Some(Blue),
            (0.0, 0.0),
            vec![
                point("batumi-s1", LandSmall, 2.0, 1.0),
                point("batumi-s2", LandSmall, 4.0, -3.0),
                point("batumi-m1", LandMedium, 8.0, 3.0),
                point("batumi-l1", LandLarge, 18.0, -2.0),
            ],
        ),
        airbase(
            "kobuleti",
            "Kobuleti",
            Some(Blue),
            (12.0, 8.0),
            vec![point("kobuleti-s1", LandSmall, 13.0, 9.0)],
        ),
        airbase(
            "senaki",
            "Senaki",
            Some(Blue),
            (30.0, 35.0),
            vec![point("senaki-s1", LandSmall, 31.0, 34.0)],
        ),
        airbase("kutaisi", "Kutaisi", Some(Blue), (40.0, 55.0), Vec::new()),
        airbase("sochi", "Sochi", None, (-40.0, 30.0), Vec::new()),
        airbase("mozdok", "Mozdok", Some(Red), (120.0, 110.0), Vec::new()),
        airbase("nalchik", "Nalchik", Some(Red), (100.0, 120.0), Vec::new()),
        airbase("beslan", "Beslan", Some(Red), (110.0, 130.0), Vec::new()),
        location(
            "zugdidi",
            "Zugdidi",
            (35.0, 25.0),
            vec![
                point("zugdidi-m1", LandMedium, 35.0, 25.0),
                point("zugdidi-m2", LandMedium, 36.0, 26.0),
                point("zugdidi-s1", LandSmall, 34.0, 24.0),
                point("zugdidi-s2", LandSmall, 36.0, 23.0),
            ],
        ),
        location(
            "gori-range",
            "Gori Range",
            (60.0, 60.0),
            vec![
                point("gori-m1", LandMedium, 60.0, 60.0),
                point("gori-m2", LandMedium, 61.0, 61.0),
                point("gori-m3", LandMedium, 59.0, 62.0),
                point("gori-s1", LandSmall, 62.0, 59.0),
                point("gori-s2", LandSmall, 58.0, 58.0),
                point("gori-l1", LandLarge, 66.0, 64.0),
            ],
        ),
        location(
            "tskhinvali",
            "Tskhinvali",
            (70.0, 75.0),
            vec![
                point("tskhinvali-m1", LandMedium, 70.0, 75.0),
                point("tskhinvali-m2", LandMedium, 72.0, 74.0),
                point("tskhinvali-s1", LandSmall, 69.0, 77.0),
                point("tskhinvali-l1", LandLarge, 78.0, 80.0),
                point("tskhinvali-l2", LandLarge, 62.0, 70.0),
            ],
        ),
        location(
            "black-sea",
            "Black Sea",
            (-12.0, 20.0),
            vec![
                point("sea-1", Sea, -10.0, 15.0),
                point("sea-2", Sea, -15.0, 25.0),
            ],
        ),
    ];

    let weather = (0..6u32)
        .map(|level| {
            let f = f64::from(level);
            WeatherPreset {
                cloud_base_m: ValueRange::new(3000.0 - f * 400.0, 3500.0 - f * 400.0),
                cloud_density: ValueRange::new(level * 2, (level * 2 + 1).min(10)),
                precipitation: match level {
                    4 => Precipitation::Rain,
                    5 => Precipitation::Thunderstorm,
                    _ => Precipitation::None,
                },
                fog_visibility_m: None,
                qnh_mmhg: ValueRange::new(765.0 - f * 4.0, 768.0 - f * 4.0),
            }
        })
        .collect();

    let wind = (0..6u32)
        .map(|level| {
            let f = f64::from(level);
            WindPreset {
                speed_mps: ValueRange::new(f * 3.0, f * 3.0 + 2.0),
                turbulence_mps: ValueRange::new(0.0, f * 0.5),
            }
        })
        .collect();

    let daylight = PerMonth::new(std::array::from_fn(|month| {
        let summer = matches!(month, 4..=7);
        DaylightWindow {
            sunrise_min: if summer { 5 * 60 + 30 } else { 7 * 60 },
            sunset_min: if summer { 20 * 60 + 30 } else { 18 * 60 },
        }
    }));

    let temperature_c = PerMonth::new(std::array::from_fn(|month| {
        let warmth = 6 - (month as i32 - 6).abs();
        ValueRange::new(warmth * 4, warmth * 4 + 8)
    }));

    TheaterDefinition {
        id: "caucasus".to_string(),
        display_name: "Caucasus".to_string(),
        default_map_center: at(50.0, 60.0),
        magnetic_variation_deg: 6.0,
        nodes,
        weather,
        wind,
        daylight,
        temperature_c,
    }
}

fn english() -> serde_json::Value {
    json!({
        "id": "english",
        "display_name": "English",
        "strings": {
            "BriefingTitle": "Operation $NAME$",
            "BriefingDateTime": "Mission start: $DATE$ at $TIME$",
            "BriefingTotalDistance": "Total flight distance: $DISTANCE$",
            "HeaderDescription": "Description",
            "HeaderTasks": "Tasks",
            "HeaderRemarks": "Remarks",
            "HeaderFlightPackage": "Flight package",
            "HeaderFlightPlan": "Flight plan",
            "DescriptionStrike1": "Enemy forces hold a command post near $LOCATION$. Destroy it, codename $OBJECTIVE$.",
            "DescriptionStrike2": "A supply depot at $LOCATION$ feeds the front. Strike $OBJECTIVE$ and return to $AIRBASE$.",
            "DescriptionAntiship": "Enemy vessels designated $OBJECTIVE$ were spotted off $LOCATION$.",
            "TaskStrike": "Destroy target $OBJECTIVE$ at $LOCATION$.",
            "TaskAntiship": "Sink the vessels designated $OBJECTIVE$ near $LOCATION$.",
            "TaskTakeoff": "Take off from $AIRBASE$.",
            "TaskLand": "Land at $AIRBASE$.",
            "RemarkStrike": "Expect heavy smoke over the target area.",
            "RemarkWeaponsFree": "Weapons free once airborne from $AIRBASE$.",
            "RemarkConvoy": "An enemy convoy moves near the objective.",
            "RemarkEnemyAirDefenseNone": "No enemy air defense reported.",
            "RemarkEnemyAirDefenseLow": "Light enemy air defense expected.",
            "RemarkEnemyAirDefenseAverage": "Moderate enemy air defense expected.",
            "RemarkEnemyAirDefenseHigh": "Dense enemy air defense expected.",
            "RemarkEnemyCapNone": "No enemy fighters reported.",
            "RemarkEnemyCapLow": "A few enemy fighters patrol the area.",
            "RemarkEnemyCapAverage": "Enemy fighters patrol the area.",
            "RemarkEnemyCapHigh": "Heavy enemy fighter presence."
        }
    })
}

pub fn library() -> Library {
    let units = json!([
        {
            "id": "fa18c", "display_name": "F/A-18C Hornet",
            "families": ["PLANE_FIGHTER", "PLANE_ATTACK"], "type_names": ["FA-18C_hornet"],
            "player_controllable": true,
            "aircraft": { "cruise_altitude_ft": 25000.0, "cruise_speed_kts": 420.0, "radio_frequency_mhz": 305.0 }
        },
        {
            "id": "f16c", "display_name": "F-16C Viper",
            "families": ["PLANE_FIGHTER"], "type_names": ["F-16C_50"],
            "player_controllable": true,
            "aircraft": { "cruise_altitude_ft": 26000.0, "cruise_speed_kts": 430.0, "radio_frequency_mhz": 251.0 }
        },
        {
            "id": "su27", "display_name": "Su-27 Flanker",
            "families": ["PLANE_FIGHTER"], "type_names": ["Su-27"],
            "aircraft": { "cruise_altitude_ft": 28000.0, "cruise_speed_kts": 450.0, "radio_frequency_mhz": 127.5 }
        },
        {
            "id": "kc135", "display_name": "KC-135",
            "families": ["PLANE_TANKER"], "type_names": ["KC-135"],
            "aircraft": { "cruise_altitude_ft": 22000.0, "cruise_speed_kts": 300.0, "radio_frequency_mhz": 251.0 }
        },
        {
            "id": "e3a", "display_name": "E-3A Sentry",
            "families": ["PLANE_AWACS"], "type_names": ["E-3A"],
            "aircraft": { "cruise_altitude_ft": 30000.0, "cruise_speed_kts": 320.0, "radio_frequency_mhz": 251.0 }
        },
        { "id": "avenger", "display_name": "M1097 Avenger", "families": ["VEHICLE_SAM_SHORT"], "type_names": ["M1097 Avenger"] },
        { "id": "hawk", "display_name": "MIM-23 Hawk", "families": ["VEHICLE_SAM_MEDIUM"], "type_names": ["Hawk ln", "Hawk sr"] },
        { "id": "sa8", "display_name": "SA-8 Gecko", "families": ["VEHICLE_SAM_SHORT"], "type_names": ["Osa 9A33 ln"] },
        { "id": "sa11", "display_name": "SA-11 Gadfly", "families": ["VEHICLE_SAM_MEDIUM"], "type_names": ["SA-11 Buk LN 9A310M1", "SA-11 Buk SR 9S18M1"] },
        { "id": "zu23", "display_name": "ZU-23", "families": ["VEHICLE_AAA"], "type_names": ["ZU-23 Emplacement"] },
        { "id": "t72", "display_name": "T-72B", "families": ["VEHICLE_ARMOR"], "type_names": ["T-72B"] },
        { "id": "ural", "display_name": "Ural-375", "families": ["VEHICLE_TRANSPORT"], "type_names": ["Ural-375"] },
        { "id": "bunker", "display_name": "Command bunker", "families": ["STATIC_STRUCTURE"], "type_names": ["Bunker"] },
        { "id": "krivak", "display_name": "Krivak frigate", "families": ["SHIP_FRIGATE"], "type_names": ["REZKY"] }
    ]);

    let coalitions = json!([
        {
            "id": "usa", "display_name": "USA", "countries": ["USA", "UK"],
            "callsign_style": "NATO", "unit_system": "IMPERIAL",
            "units": {
                "PLANE_FIGHTER": ["fa18c", "f16c"],
                "PLANE_TANKER": ["kc135"],
                "PLANE_AWACS": ["e3a"],
                "VEHICLE_SAM_SHORT": ["avenger"],
                "VEHICLE_SAM_MEDIUM": ["hawk"]
            }
        },
        {
            "id": "russia", "display_name": "Russia", "countries": ["Russia", "Belarus"],
            "callsign_style": "RUSSIAN", "unit_system": "METRIC",
            "units": {
                "PLANE_FIGHTER": ["su27"],
                "VEHICLE_SAM_SHORT": ["sa8"],
                "VEHICLE_SAM_MEDIUM": ["sa11"],
                "VEHICLE_AAA": ["zu23"],
                "VEHICLE_ARMOR": ["t72"],
                "VEHICLE_TRANSPORT": ["ural"],
                "STATIC_STRUCTURE": ["bunker"],
                "SHIP_FRIGATE": ["krivak"]
            }
        }
    ]);

    let objectives = json!([
        {
            "id": "strike", "display_name": "Strike",
            "spawn_point_types": ["LAND_MEDIUM"],
            "waypoint_inaccuracy_nm": { "min": 0.5, "max": 1.0 },
            "waypoint_altitude_ft": { "min": 15000.0, "max": 20000.0 },
            "target_side": "ENEMY",
            "target_families": ["STATIC_STRUCTURE"],
            "target_group_size": { "min": 1, "max": 3 },
            "defense_families": ["VEHICLE_AAA", "VEHICLE_ARMOR"],
            "description_keys": ["DescriptionStrike1", "DescriptionStrike2"],
            "task_key": "TaskStrike",
            "remark_keys": ["RemarkStrike", "RemarkWeaponsFree"],
            "media_files": ["radio_strike.ogg"]
        },
        {
            "id": "antiship", "display_name": "Anti-ship strike",
            "spawn_point_types": ["SEA"],
            "waypoint_inaccuracy_nm": { "min": 1.0, "max": 2.0 },
            "waypoint_altitude_ft": { "min": 2000.0, "max": 5000.0 },
            "target_side": "ENEMY",
            "target_families": ["SHIP_FRIGATE"],
            "target_group_size": { "min": 1, "max": 2 },
            "description_keys": ["DescriptionAntiship"],
            "task_key": "TaskAntiship"
        }
    ]);

    let features = json!([
        {
            "id": "convoy", "display_name": "Enemy convoy", "side": "ENEMY",
            "families": ["VEHICLE_TRANSPORT"],
            "unit_count": { "min": 1, "max": 2 },
            "spawn_point_types": ["LAND_SMALL"],
            "spawn_distance_nm": { "min": 1.0, "max": 5.0 },
            "remark_key": "RemarkConvoy",
            "media_files": ["convoy.ogg"]
        }
    ]);

    let bundle = DefinitionBundle {
        defaults: LibraryDefaults {
            theater: "caucasus".to_string(),
            coalition_blue: "usa".to_string(),
            coalition_red: "russia".to_string(),
            language: "english".to_string(),
            objective: "strike".to_string(),
            player_aircraft: "fa18c".to_string(),
        },
        theaters: vec![theater()],
        units: serde_json::from_value(units).unwrap(),
        coalitions: serde_json::from_value(coalitions).unwrap(),
        objectives: serde_json::from_value(objectives).unwrap(),
        languages: vec![serde_json::from_value(english()).unwrap()],
        features: serde_json::from_value(features).unwrap(),
    };

    Library::from_bundle(bundle).unwrap()
}

/// Blue player, two strike objectives at medium range, one Hornet two-ship
pub fn template() -> MissionTemplate {
    serde_json::from_value(json!({
        "theater": "caucasus",
        "coalitions": { "blue": "usa", "red": "russia" },
        "player_coalition": "BLUE",
        "objective_type": "strike",
        "objective_count": { "FIXED": 2 },
        "objective_distance": "MEDIUM",
        "player_flight_groups": [ { "aircraft": "fa18c", "count": 2 } ],
        "seed": 1234
    }))
    .unwrap()
}

pub fn run_context<'a>(library: &'a Library, template: &'a MissionTemplate, seed: u64) -> RunContext<'a> {
    let theater = library.get::<TheaterDefinition>(&template.theater).unwrap();
    let coalitions = PerCoalition::from_fn(|c| {
        library
            .get::<CoalitionDefinition>(&template.coalitions[c])
            .unwrap()
    });
    let countries = assign_countries(coalitions, template.player_coalition).unwrap();

    RunContext::new(
        library,
        template,
        theater,
        coalitions,
        countries,
        SpawnSearchConfig::default(),
        seed,
        GenerationLog::new(),
    )
}

pub fn unit_generator() -> UnitGroupGenerator {
    UnitGroupGenerator::new(CallsignGenerator::new(PerCoalition::new(
        CallsignStyle::Nato,
        CallsignStyle::Russian,
    )))
}

/// Airbases owned as their theater defaults say
pub fn assign_default_airbases(ctx: &mut RunContext<'_>) {
    let theater = ctx.theater;
    ctx.airbase_coalitions = theater
        .airbases()
        .filter_map(|n| n.default_coalition.map(|c| (n.id.clone(), c)))
        .collect();
}
