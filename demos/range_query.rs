//! Range Query Example
//!
//! Builds a small metro network around central Oslo and asks which legs,
//! trips and journeys pass through a few areas.

use std::error::Error;
use stopgrid::prelude::*;
use stopgrid::{
    Direction, ServiceLinkInJourneyPattern, StopPointInJourneyPattern, TimetabledPassingTime,
};

fn id(text: &str) -> std::result::Result<Id, StopgridError> {
    text.parse()
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    env_logger::init();
    println!("=== stopgrid - Range Queries ===\n");

    let stops = [
        ("RUT:ScheduledStopPoint:1", "Jernbanetorget"),
        ("RUT:ScheduledStopPoint:2", "Stortinget"),
        ("RUT:ScheduledStopPoint:3", "Nationaltheatret"),
        ("RUT:ScheduledStopPoint:4", "Majorstuen"),
    ];
    let links = [
        ("1", "59.911900 10.750200 59.912700 10.745300 59.913200 10.741400"),
        ("2", "59.913200 10.741400 59.914000 10.735800"),
        ("3", "59.914000 10.735800 59.917800 10.728900 59.929700 10.714900"),
    ];

    let mut builder = DatabaseBuilder::new().scale(Scale::DEFAULT);
    for (stop_id, name) in stops {
        builder = builder.entity(ScheduledStopPoint::new(id(stop_id)?, name));
    }
    for (n, (local, pos_list)) in links.iter().enumerate() {
        builder = builder.entity(ServiceLink::new(
            id(&format!("RUT:ServiceLink:{}", local))?,
            id(stops[n].0)?,
            id(stops[n + 1].0)?,
            vec![LinkSequenceProjection::from_pos_list(
                id(&format!("RUT:LinkSequenceProjection:{}", local))?,
                pos_list,
            )?],
        ));
    }

    let points = (0..4u32)
        .map(|i| {
            Ok(StopPointInJourneyPattern::new(
                id(&format!("RUT:StopPointInJourneyPattern:{}", i + 1))?,
                i + 1,
                id(stops[i as usize].0)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    let links_in_sequence = (0..3u32)
        .map(|i| {
            Ok(ServiceLinkInJourneyPattern::new(
                id(&format!("RUT:ServiceLinkInJourneyPattern:{}", i + 1))?,
                i + 1,
                id(&format!("RUT:ServiceLink:{}", i + 1))?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    builder = builder
        .entity(Line::new(id("RUT:Line:2")?, "2", "metro"))
        .entity(Route::new(
            id("RUT:Route:2")?,
            "Ellingsrudåsen - Østerås",
            Some(id("RUT:Line:2")?),
        ))
        .entity(JourneyPattern::new(
            id("RUT:JourneyPattern:2")?,
            "Westbound",
            Some(id("RUT:Route:2")?),
            points,
            links_in_sequence,
        ));

    for (run, start) in ["07:02:00", "07:17:00"].iter().enumerate() {
        let passing_times = vec![TimetabledPassingTime::parse(
            id(&format!("RUT:TimetabledPassingTime:{}_1", run))?,
            id("RUT:StopPointInJourneyPattern:1")?,
            start,
        )?];
        builder = builder.entity(ServiceJourney::new(
            id(&format!("RUT:ServiceJourney:{}", run))?,
            "",
            id("RUT:JourneyPattern:2")?,
            passing_times,
        ));
    }

    let db = builder.build()?;
    println!("✓ {}\n", db);

    // ========================================
    // 1. A small square around a station
    // ========================================
    let stortinget = Point::new(59.9132, 10.7414)?;
    let around = stortinget.square_box(Distance::of(150, Unit::M)?);
    println!("1. Within 150 m of Stortinget ({})", around);
    for leg in db.service_legs(std::slice::from_ref(&around)) {
        println!("   {}", leg);
    }

    // ========================================
    // 2. Several boxes at once
    // ========================================
    let north = stortinget.translate(Direction::North, Distance::of(2, Unit::Km)?);
    let boxes = [
        around.clone(),
        north.square_box(Distance::of(500, Unit::M)?),
    ];
    println!("\n2. Stortinget and 2 km north of it");
    for trip in db.trip_definitions(&boxes) {
        println!("   {}", trip);
    }

    // ========================================
    // 3. Journeys through the area
    // ========================================
    println!("\n3. Journeys near Stortinget");
    for journey in db.journeys(std::slice::from_ref(&around)) {
        println!("   {}", journey);
    }

    // ========================================
    // 4. Index statistics
    // ========================================
    let stats = db.stats();
    println!("\n4. Statistics");
    println!(
        "   service legs: {} in {} cells",
        stats.service_legs.entries, stats.service_legs.cells
    );
    println!(
        "   trips: {} in {} cells",
        stats.trip_definitions.entries, stats.trip_definitions.cells
    );
    println!("   journeys: {}", stats.journeys);

    Ok(())
}
