//! Reference values for the GOES-R fixed grid.
//!
//! Transform fixtures are for the GOES-East slot (nadir -75.0).

/// Known geodetic/scan-angle pairs.
pub mod transforms {
    /// A point with its expected scan angles.
    #[derive(Debug, Clone, Copy)]
    pub struct KnownScan {
        pub lat: f64,
        pub lon: f64,
        pub y: f64,
        pub x: f64,
    }

    pub const KNOWN_SCANS: [KnownScan; 2] = [
        // PUG worked example
        KnownScan {
            lat: 48.0563,
            lon: -70.1242,
            y: 0.12390,
            x: 0.00950,
        },
        KnownScan {
            lat: 33.943546,
            lon: -84.52599,
            y: 0.09557,
            x: -0.02361,
        },
    ];

    /// A corner of a scan-angle box.
    #[derive(Debug, Clone, Copy)]
    pub struct CornerFixture {
        pub name: &'static str,
        pub y: f64,
        pub x: f64,
        pub lat: f64,
        pub lon: f64,
    }

    /// Corners of a box over the central United States, good to three
    /// decimal places.
    pub const CENTRAL_US_CORNERS: [CornerFixture; 4] = [
        CornerFixture {
            name: "NW",
            y: 0.11088,
            x: -0.0728,
            lat: 42.324332772441274,
            lon: -111.59881367398036,
        },
        CornerFixture {
            name: "NE",
            y: 0.11088,
            x: -0.0448,
            lat: 41.3977345174855,
            lon: -95.77874169810512,
        },
        CornerFixture {
            name: "SW",
            y: 0.08288,
            x: -0.0728,
            lat: 29.26380930573638,
            lon: -104.3619728276011,
        },
        CornerFixture {
            name: "SE",
            y: 0.08288,
            x: -0.0448,
            lat: 28.846349046410847,
            lon: -92.23420546697386,
        },
    ];
}

/// Expected pixel counts per sector and resolution key.
pub mod sectors {
    /// `(sector, resolution, pixels_ew, pixels_ns)`
    pub const PIXEL_COUNTS: [(&str, &str, usize, usize); 21] = [
        ("full", "0.5", 21696, 21696),
        ("full", "1.0", 10848, 10848),
        ("full", "2.0", 5424, 5424),
        ("full", "4.0", 2712, 2712),
        ("full", "8.0", 1356, 1356),
        ("full", "10.0", 1084, 1084),
        ("full", "100.0", 108, 108),
        ("conus", "0.5", 10000, 6000),
        ("conus", "1.0", 5000, 3000),
        ("conus", "2.0", 2500, 1500),
        ("conus", "4.0", 1250, 750),
        ("conus", "8.0", 625, 375),
        ("conus", "10.0", 500, 300),
        ("conus", "100.0", 50, 30),
        ("meso", "0.5", 2000, 2000),
        ("meso", "1.0", 1000, 1000),
        ("meso", "2.0", 500, 500),
        ("meso", "4.0", 250, 250),
        ("meso", "8.0", 125, 125),
        ("meso", "10.0", 100, 100),
        ("meso", "100.0", 10, 10),
    ];

    /// Every satellite slot in the catalog.
    pub const POSITIONS: [&str; 3] = ["east", "west", "test"];
}
