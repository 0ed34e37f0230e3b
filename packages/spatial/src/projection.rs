//! WGS84 to British National Grid projection.
//!
//! Converts geodetic coordinates to metric eastings/northings in three
//! steps: geodetic to cartesian on the WGS84 ellipsoid, a seven-parameter
//! Helmert shift onto the Airy 1830 ellipsoid, then the Ordnance Survey
//! transverse Mercator projection. Accuracy of the Helmert shift is a few
//! metres nationally, which is ample for kilometre-scale binning.

use geo::Coord;
use hotspot_map_incident_models::IncidentRecord;

// WGS84 ellipsoid.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

// Airy 1830 ellipsoid (OSGB36).
const AIRY_A: f64 = 6_377_563.396;
const AIRY_B: f64 = 6_356_256.909;

// National grid transverse Mercator parameters.
const SCALE_F0: f64 = 0.999_601_271_7;
const ORIGIN_LAT_DEG: f64 = 49.0;
const ORIGIN_LON_DEG: f64 = -2.0;
const FALSE_EASTING: f64 = 400_000.0;
const FALSE_NORTHING: f64 = -100_000.0;

// WGS84 -> OSGB36 Helmert parameters: translation in metres, scale in
// parts per million, rotations in arc-seconds.
const HELMERT_TX: f64 = -446.448;
const HELMERT_TY: f64 = 125.157;
const HELMERT_TZ: f64 = -542.060;
const HELMERT_S_PPM: f64 = 20.489_4;
const HELMERT_RX_SEC: f64 = -0.150_2;
const HELMERT_RY_SEC: f64 = -0.247_0;
const HELMERT_RZ_SEC: f64 = -0.842_1;

/// Projects a WGS84 geodetic coordinate to national grid
/// easting/northing in metres.
#[must_use]
pub fn wgs84_to_national_grid(latitude: f64, longitude: f64) -> Coord<f64> {
    let (lat_osgb, lon_osgb) = wgs84_to_osgb36(latitude, longitude);
    osgb36_to_grid(lat_osgb, lon_osgb)
}

/// Populates `projected_x`/`projected_y` on every record that carries
/// coordinates. Records without coordinates are left untouched.
pub fn project_records(records: &mut [IncidentRecord]) {
    let mut projected = 0_usize;
    for record in records.iter_mut() {
        if let (Some(lat), Some(lng)) = (record.latitude, record.longitude) {
            let coord = wgs84_to_national_grid(lat, lng);
            record.projected_x = Some(coord.x);
            record.projected_y = Some(coord.y);
            projected += 1;
        }
    }
    log::debug!("Projected {projected}/{} records", records.len());
}

/// Datum shift from WGS84 geodetic coordinates to OSGB36 geodetic
/// coordinates via cartesian Helmert transformation.
fn wgs84_to_osgb36(latitude: f64, longitude: f64) -> (f64, f64) {
    // Geodetic -> cartesian on WGS84.
    let e2 = WGS84_F.mul_add(-WGS84_F, 2.0 * WGS84_F);
    let phi = latitude.to_radians();
    let lambda = longitude.to_radians();
    let nu = WGS84_A / (1.0 - e2 * phi.sin() * phi.sin()).sqrt();
    let x = nu * phi.cos() * lambda.cos();
    let y = nu * phi.cos() * lambda.sin();
    let z = (1.0 - e2) * nu * phi.sin();

    // Helmert shift onto Airy 1830.
    let s = 1.0 + HELMERT_S_PPM * 1e-6;
    let rx = (HELMERT_RX_SEC / 3600.0).to_radians();
    let ry = (HELMERT_RY_SEC / 3600.0).to_radians();
    let rz = (HELMERT_RZ_SEC / 3600.0).to_radians();
    let xp = rz.mul_add(-y, HELMERT_TX + s * x) + ry * z;
    let yp = rx.mul_add(-z, rz.mul_add(x, HELMERT_TY) + s * y);
    let zp = ry.mul_add(-x, HELMERT_TZ) + rx * y + s * z;

    // Cartesian -> geodetic on Airy 1830, iterating latitude.
    let e2_airy = airy_e2();
    let p = xp.hypot(yp);
    let mut phi_osgb = (zp / (p * (1.0 - e2_airy))).atan();
    for _ in 0..8 {
        let nu_airy = AIRY_A / (1.0 - e2_airy * phi_osgb.sin() * phi_osgb.sin()).sqrt();
        phi_osgb = ((zp + e2_airy * nu_airy * phi_osgb.sin()) / p).atan();
    }
    let lambda_osgb = yp.atan2(xp);

    (phi_osgb.to_degrees(), lambda_osgb.to_degrees())
}

const fn airy_e2() -> f64 {
    (AIRY_A * AIRY_A - AIRY_B * AIRY_B) / (AIRY_A * AIRY_A)
}

/// Ordnance Survey transverse Mercator projection from OSGB36 geodetic
/// coordinates to easting/northing.
#[allow(clippy::similar_names, clippy::many_single_char_names)]
fn osgb36_to_grid(latitude: f64, longitude: f64) -> Coord<f64> {
    let phi = latitude.to_radians();
    let lambda = longitude.to_radians();
    let phi0 = ORIGIN_LAT_DEG.to_radians();
    let lambda0 = ORIGIN_LON_DEG.to_radians();

    let e2 = airy_e2();
    let n = (AIRY_A - AIRY_B) / (AIRY_A + AIRY_B);

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let nu = AIRY_A * SCALE_F0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let rho = AIRY_A * SCALE_F0 * (1.0 - e2) / (1.0 - e2 * sin_phi * sin_phi).powf(1.5);
    let eta2 = nu / rho - 1.0;

    let n2 = n * n;
    let n3 = n2 * n;
    let m = AIRY_B
        * SCALE_F0
        * ((1.0 + n + 1.25 * n2 + 1.25 * n3) * (phi - phi0)
            - (3.0 * n + 3.0 * n2 + 2.625 * n3) * (phi - phi0).sin() * (phi + phi0).cos()
            + (1.875 * n2 + 1.875 * n3) * (2.0 * (phi - phi0)).sin() * (2.0 * (phi + phi0)).cos()
            - (35.0 / 24.0) * n3 * (3.0 * (phi - phi0)).sin() * (3.0 * (phi + phi0)).cos());

    let tan2 = tan_phi * tan_phi;
    let tan4 = tan2 * tan2;
    let cos3 = cos_phi.powi(3);
    let cos5 = cos_phi.powi(5);

    let i = m + FALSE_NORTHING;
    let ii = nu / 2.0 * sin_phi * cos_phi;
    let iii = nu / 24.0 * sin_phi * cos3 * 9.0_f64.mul_add(eta2, 5.0 - tan2);
    let iiia = nu / 720.0 * sin_phi * cos5 * (61.0 - 58.0 * tan2 + tan4);
    let iv = nu * cos_phi;
    let v = nu / 6.0 * cos3 * (nu / rho - tan2);
    let vi = nu / 120.0
        * cos5
        * (5.0 - 18.0 * tan2 + tan4 + 14.0 * eta2 - 58.0 * tan2 * eta2);

    let dl = lambda - lambda0;
    let dl2 = dl * dl;

    let northing = iiia.mul_add(dl2 * dl2 * dl2, iii.mul_add(dl2 * dl2, ii.mul_add(dl2, i)));
    let easting = vi.mul_add(
        dl2 * dl2 * dl,
        v.mul_add(dl2 * dl, iv.mul_add(dl, FALSE_EASTING)),
    );

    Coord {
        x: easting,
        y: northing,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn matches_os_worked_example() {
        // OSGB36 input 52°39'27.2531"N 1°43'4.5177"E, published result
        // E 651409.903, N 313177.270.
        let latitude = 52.0 + 39.0 / 60.0 + 27.2531 / 3600.0;
        let longitude = 1.0 + 43.0 / 60.0 + 4.5177 / 3600.0;
        let coord = osgb36_to_grid(latitude, longitude);
        assert!((coord.x - 651_409.903).abs() < 0.05, "easting {}", coord.x);
        assert!((coord.y - 313_177.270).abs() < 0.05, "northing {}", coord.y);
    }

    #[test]
    fn central_london_lands_near_trafalgar_square() {
        // Charles I statue at Trafalgar Square, WGS84 51.50742 N
        // 0.12772 W, grid ref around E 530040 N 180400. The Helmert
        // shift is only good to a few metres, so the tolerance is
        // deliberately loose.
        let coord = wgs84_to_national_grid(51.507_42, -0.127_72);
        assert!((coord.x - 530_040.0).abs() < 150.0, "easting {}", coord.x);
        assert!((coord.y - 180_400.0).abs() < 150.0, "northing {}", coord.y);
    }

    #[test]
    fn projection_is_monotonic_eastwards() {
        let west = wgs84_to_national_grid(52.0, -1.0);
        let east = wgs84_to_national_grid(52.0, -0.5);
        assert!(east.x > west.x);
    }

    #[test]
    fn project_records_skips_missing_coordinates() {
        let template = IncidentRecord {
            crime_id: None,
            month_raw: None,
            month: None,
            force: "Test Force".to_string(),
            category: "burglary".to_string(),
            latitude: Some(51.5),
            longitude: Some(-0.1),
            projected_x: None,
            projected_y: None,
            outcome_status: None,
            extra: BTreeMap::new(),
        };
        let mut missing = template.clone();
        missing.latitude = None;
        missing.longitude = None;
        let mut records = vec![template, missing];

        project_records(&mut records);

        assert!(records[0].projected().is_some());
        assert!(records[1].projected().is_none());
    }
}
