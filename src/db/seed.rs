use rusqlite::Connection;

use crate::db::queries;
use crate::models::{NewHairStyle, NewService, StepInput};

struct SeedService {
    name: &'static str,
    price: f64,
    minutes: i64,
    description: &'static str,
    steps: &'static [&'static str],
}

const SERVICES: &[SeedService] = &[
    SeedService {
        name: "Signature Cut",
        price: 100_000.0,
        minutes: 45,
        description: "Consultation, cut and style finished by a senior stylist.",
        steps: &["Consultation", "Wash", "Cut", "Style"],
    },
    SeedService {
        name: "Relaxing Wash",
        price: 50_000.0,
        minutes: 20,
        description: "Double shampoo with scalp massage.",
        steps: &["Shampoo", "Scalp massage", "Rinse"],
    },
    SeedService {
        name: "Perm",
        price: 350_000.0,
        minutes: 120,
        description: "Long-lasting curls or waves.",
        steps: &["Consultation", "Rolling", "Solution", "Neutralise", "Style"],
    },
    SeedService {
        name: "Colour",
        price: 400_000.0,
        minutes: 90,
        description: "Full-head colour with ammonia-free dye.",
        steps: &["Patch test", "Application", "Processing", "Rinse", "Style"],
    },
];

const HAIR_STYLES: &[(&str, &str)] = &[
    ("Undercut", "Short sides with a longer top."),
    ("Side Part", "Classic side-parted look."),
    ("Textured Crop", "Short, messy fringe with volume."),
    ("Long Layers", "Layered cut for long hair."),
];

/// Inserts the demo catalog unless services already exist. Returns whether
/// anything was written.
pub fn seed_catalog(conn: &mut Connection) -> anyhow::Result<bool> {
    if queries::count_services(conn)? > 0 {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    for seed in SERVICES {
        let steps: Vec<StepInput> = seed
            .steps
            .iter()
            .map(|title| StepInput {
                step_title: title.to_string(),
                step_description: None,
                step_image_url: None,
            })
            .collect();
        let id = queries::insert_service(
            &tx,
            &NewService {
                service_name: seed.name.to_string(),
                price: seed.price,
                estimated_time: Some(seed.minutes),
                description: Some(seed.description.to_string()),
                banner_image_url: None,
                steps: vec![],
            },
        )?;
        queries::replace_service_steps(&tx, id, &steps)?;
    }
    for (name, description) in HAIR_STYLES {
        queries::insert_hair_style(
            &tx,
            &NewHairStyle {
                name: name.to_string(),
                description: Some(description.to_string()),
                image_url: None,
            },
        )?;
    }
    tx.commit()?;

    tracing::info!(
        services = SERVICES.len(),
        hair_styles = HAIR_STYLES.len(),
        "seeded demo catalog"
    );
    Ok(true)
}
