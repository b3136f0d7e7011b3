mod support;

use geochem_rdf::geometry::{Hemisphere, UtmZone, build_point};
use geochem_rdf::registry::Registries;
use geochem_rdf::rows::RowWalker;
use geochem_rdf::template::{TEMPLATE_V3_0, USER_LABORATORIES};
use geochem_rdf::vocab::{Catalogue, CatalogueView};
use geochem_rdf::workbook::MemoryWorkbook;
use proptest::prelude::*;
use support::text;

fn hemisphere() -> impl Strategy<Value = Hemisphere> {
    prop_oneof![Just(Hemisphere::North), Just(Hemisphere::South)]
}

proptest! {
    #[test]
    fn projected_points_stay_in_their_hemisphere(
        zone in 1u8..=60,
        hemisphere in hemisphere(),
        easting in 200_000.0f64..800_000.0,
        northing in 1_000_000.0f64..9_000_000.0,
    ) {
        let crs = UtmZone::new(zone, hemisphere);
        let (lon, lat) = crs.to_geographic(easting, northing).expect("inside the zone");
        prop_assert!(lon.is_finite());
        match hemisphere {
            Hemisphere::North => prop_assert!(lat > 0.0 && lat < 90.0, "lat {}", lat),
            Hemisphere::South => prop_assert!(lat < 0.0 && lat > -90.0, "lat {}", lat),
        }
    }

    #[test]
    fn false_easting_lies_on_the_central_meridian(
        zone in 1u8..=60,
        northing in 1_000_000.0f64..9_000_000.0,
    ) {
        let (lon, _) = UtmZone::new(zone, Hemisphere::South)
            .to_geographic(500_000.0, northing)
            .expect("on the meridian");
        let central = f64::from(zone) * 6.0 - 183.0;
        prop_assert!((lon - central).abs() < 1e-9);
    }

    #[test]
    fn elevation_makes_a_3d_point(
        elevation in proptest::option::of(-500.0f64..3_000.0),
    ) {
        let wkt = build_point(500_000.0, 7_000_000.0, elevation, &UtmZone::default())
            .expect("valid collar");
        let expected = if elevation.is_some() { "POINT Z (" } else { "POINT (" };
        prop_assert!(wkt.value().starts_with(expected));
    }

    #[test]
    fn walker_reads_up_to_the_first_gap(
        rows in 0u32..25,
        trailing in 0u32..5,
    ) {
        let mut book = MemoryWorkbook::new();
        book.add_sheet(USER_LABORATORIES);
        for offset in 0..rows {
            let row = 9 + offset;
            book.set(USER_LABORATORIES, &format!("B{row}"), text(&format!("LAB{offset}")))
                .set(USER_LABORATORIES, &format!("C{row}"), text("Brisbane"));
        }
        // rows after the gap are never reached
        for offset in 0..trailing {
            let row = 10 + rows + offset;
            book.set(USER_LABORATORIES, &format!("B{row}"), text("LOST"));
        }

        let catalogue = Catalogue::new();
        let view = CatalogueView::new(&catalogue);
        let registries = Registries::new();
        let mut walker = RowWalker::new(&TEMPLATE_V3_0.user_laboratories, &book);
        let mut numbers = Vec::new();
        while let Some(row) = walker.next_row(&view, &registries).expect("valid rows") {
            numbers.push(row.number);
        }
        prop_assert_eq!(numbers, (9..9 + rows).collect::<Vec<_>>());
        prop_assert_eq!(walker.rows_read(), rows as usize);
    }
}
