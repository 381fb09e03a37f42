//! Environment generation: date, time of day, weather and wind.

use chrono::{Datelike, Days, NaiveDate};
use mission_domain::{
    DaylightWindow, Decade, Environment, EnvironmentOptions, Month, Season, TheaterDefinition,
    TimeOfDay, WeatherLevel, WindLayer, WindLevel,
};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand_distr::Normal;

/// Draw weights for random weather/wind levels, calmest level first.
/// Calm conditions are six times as likely as the most extreme ones.
pub const CALM_BIAS_WEIGHTS: [u32; 6] = [6, 5, 4, 3, 2, 1];

const MINUTES_PER_DAY: u32 = 24 * 60;
const WIND_LAYER_ALTITUDES_M: [f64; 3] = [10.0, 2000.0, 8000.0];
const WIND_LAYER_SPEED_FACTORS: [f64; 3] = [1.0, 1.6, 2.4];
const WIND_VEER_STD_DEG: f64 = 15.0;
const NIGHT_COOLING_C: i32 = 4;

/// Resolve every environment setting of a template against a theater
pub fn generate_environment<R: Rng + ?Sized>(
    options: &EnvironmentOptions,
    theater: &TheaterDefinition,
    rng: &mut R,
) -> Environment {
    let date = random_date(options.decade, options.season, rng);
    let month = Month::from_number(date.month()).unwrap_or(Month::January);
    let daylight = theater.daylight[month];

    let time_of_day = resolve_time_of_day(options.time_of_day, rng);
    let start_time_s = start_minute(time_of_day, daylight, rng) * 60;

    let weather_index = options
        .weather
        .index()
        .unwrap_or_else(|| calm_biased_index(rng));
    let wind_index = options
        .wind
        .index()
        .unwrap_or_else(|| calm_biased_index(rng));

    let weather = &theater.weather[weather_index];
    let wind = &theater.wind[wind_index];

    let mut temperature_c = theater.temperature_c[month].random(rng);
    if matches!(time_of_day, TimeOfDay::Night | TimeOfDay::Dawn) {
        temperature_c -= NIGHT_COOLING_C;
    }

    Environment {
        date,
        time_of_day,
        start_time_s,
        weather_level: WeatherLevel::from_index(weather_index).unwrap_or_default(),
        wind_level: WindLevel::from_index(wind_index).unwrap_or_default(),
        cloud_base_m: weather.cloud_base_m.random(rng),
        cloud_density: weather.cloud_density.random(rng).min(10),
        precipitation: weather.precipitation,
        fog_visibility_m: weather.fog_visibility_m.map(|range| range.random(rng)),
        qnh_mmhg: weather.qnh_mmhg.random(rng),
        temperature_c,
        turbulence_mps: wind.turbulence_mps.random(rng),
        wind: wind_layers(wind.speed_mps.random(rng), rng),
    }
}

/// Year within the decade, month within the season, day within the month
pub fn random_date<R: Rng + ?Sized>(decade: Decade, season: Season, rng: &mut R) -> NaiveDate {
    let decade = match decade {
        Decade::Random => *Decade::CONCRETE.choose(rng).unwrap_or(&Decade::D2000),
        concrete => concrete,
    };
    let season = match season {
        Season::Random => *Season::CONCRETE.choose(rng).unwrap_or(&Season::Summer),
        concrete => concrete,
    };

    let year = decade.start_year().unwrap_or(2000) + rng.gen_range(0..10);
    let months = season.months().unwrap_or([Month::June, Month::July, Month::August]);
    let month = months[rng.gen_range(0..months.len())].number();

    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let day_offset = rng.gen_range(0..days_in_month(year, month));
    first
        .checked_add_days(Days::new(u64::from(day_offset)))
        .unwrap_or(first)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

/// Weighted draw of a level index favouring calm conditions
pub fn calm_biased_index<R: Rng + ?Sized>(rng: &mut R) -> usize {
    WeightedIndex::new(CALM_BIAS_WEIGHTS).map_or(0, |dist| dist.sample(rng))
}

pub fn resolve_time_of_day<R: Rng + ?Sized>(requested: TimeOfDay, rng: &mut R) -> TimeOfDay {
    match requested {
        TimeOfDay::Random => *TimeOfDay::CONCRETE
            .choose(rng)
            .unwrap_or(&TimeOfDay::Daylight),
        concrete => concrete,
    }
}

/// Start time in minutes after midnight for a concrete time of day
pub fn start_minute<R: Rng + ?Sized>(
    time_of_day: TimeOfDay,
    daylight: DaylightWindow,
    rng: &mut R,
) -> u32 {
    let DaylightWindow {
        sunrise_min,
        sunset_min,
    } = daylight;

    // Windows around a moment are shifted by a day so they may cross midnight
    let around = |moment: u32, half: u32| (moment + MINUTES_PER_DAY - half, moment + MINUTES_PER_DAY + half);

    let (from, to) = match time_of_day {
        TimeOfDay::Dawn => around(sunrise_min, 30),
        TimeOfDay::Noon => around(daylight.noon_min(), 60),
        TimeOfDay::Twilight => around(sunset_min, 30),
        TimeOfDay::Night => {
            // From an hour after sunset to an hour before the next sunrise
            let from = sunset_min + 60;
            let to = (sunrise_min + MINUTES_PER_DAY).saturating_sub(60);
            if to <= from {
                return 0;
            }
            return rng.gen_range(from..=to) % MINUTES_PER_DAY;
        }
        TimeOfDay::Daylight | TimeOfDay::Random => {
            let from = sunrise_min + 30;
            let to = sunset_min.saturating_sub(60);
            if to <= from {
                return daylight.noon_min();
            }
            (from, to)
        }
    };

    rng.gen_range(from..=to) % MINUTES_PER_DAY
}

fn wind_layers<R: Rng + ?Sized>(ground_speed_mps: f64, rng: &mut R) -> [WindLayer; 3] {
    let veer = Normal::new(0.0, WIND_VEER_STD_DEG).ok();
    let mut direction = rng.gen_range(0.0..360.0);

    std::array::from_fn(|i| {
        if i > 0 {
            let shift = veer.map_or(0.0, |n| n.sample(&mut *rng));
            direction = f64::rem_euclid(direction + shift, 360.0);
        }
        WindLayer {
            altitude_m: WIND_LAYER_ALTITUDES_M[i],
            speed_mps: ground_speed_mps * WIND_LAYER_SPEED_FACTORS[i],
            direction_deg: direction,
        }
    })
}
