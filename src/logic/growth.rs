//! Crop growth geometry: basal crop coefficient over the FAO-56 stage
//! curve, plant height, root depth, and canopy cover fraction.
//!
//! The balance engine calls these in order (Kcb, then height, then root
//! depth, then canopy fraction once Kcmax is known). Measured overrides
//! replace the modeled value only when positive.

use super::clamp3;
use crate::models::parameters::Parameters;

/// Tabular and effective basal crop coefficient for day `day` (0-based
/// from the start of the initial stage), FAO-56 Tables 11 and 17.
///
/// The development and late-season segments advance incrementally from
/// yesterday's values, so an override propagates forward instead of
/// snapping back to the table.
pub fn basal_kcb(
    par: &Parameters,
    day: u32,
    prev_t_kcb: f64,
    prev_kcb: f64,
    update: Option<f64>,
) -> (f64, f64) {
    let s1 = par.l_ini;
    let s2 = s1 + par.l_dev;
    let s3 = s2 + par.l_mid;
    let s4 = s3 + par.l_end;

    let (t_kcb, mut kcb) = if day <= s1 {
        (par.kcb_ini, par.kcb_ini)
    } else if day <= s2 {
        let step = (par.kcb_mid - par.kcb_ini) / par.l_dev as f64;
        (prev_t_kcb + step, prev_kcb + step)
    } else if day <= s3 {
        (par.kcb_mid, par.kcb_mid)
    } else if day <= s4 {
        let step = (par.kcb_end - par.kcb_mid) / par.l_end as f64;
        (prev_t_kcb + step, prev_kcb + step)
    } else {
        (par.kcb_end, par.kcb_end)
    };

    if let Some(upd) = update {
        if upd > 0.0 {
            kcb = upd;
        }
    }
    (t_kcb, kcb)
}

/// Plant height (m), monotone non-decreasing, scaled between h_ini and
/// h_max by the Kcb curve position.
pub fn plant_height(par: &Parameters, kcb: f64, prev_h: f64, update: Option<f64>) -> f64 {
    let scaled =
        par.h_ini + (par.h_max - par.h_ini) * (kcb - par.kcb_ini) / (par.kcb_mid - par.kcb_ini);
    let mut h = scaled.max(0.001).max(prev_h);
    if let Some(upd) = update {
        if upd > 0.0 {
            h = upd;
        }
    }
    h
}

/// Root depth (m), day-count method over the initial and development
/// stages (FAO-56 page 279). Puddled fields restrict roots to the
/// puddled layer, so the depth is pinned at the maximum from day one.
pub fn root_depth(par: &Parameters, day: u32, prev_zr: f64, puddled: bool) -> f64 {
    if prev_zr < par.zr_max && !puddled {
        let scaled = par.zr_ini
            + (par.zr_max - par.zr_ini) * day as f64 / (par.l_ini + par.l_dev) as f64;
        scaled.max(0.001).max(prev_zr)
    } else {
        par.zr_max
    }
}

/// Canopy cover fraction in [0, 0.99], FAO-56 Eq. 76.
pub fn canopy_fraction(
    par: &Parameters,
    kcb: f64,
    kcmax: f64,
    h: f64,
    update: Option<f64>,
) -> f64 {
    let base = ((kcb - par.kcb_ini) / (kcmax - par.kcb_ini)).powf(1.0 + 0.5 * h);
    let mut fc = clamp3(0.0, base, 0.99);
    if let Some(upd) = update {
        if upd > 0.0 {
            fc = upd;
        }
    }
    fc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn par() -> Parameters {
        Parameters::default()
    }

    #[test]
    fn kcb_flat_in_initial_stage() {
        let p = par();
        let (t, k) = basal_kcb(&p, 0, 0.0, 0.0, None);
        assert_eq!((t, k), (p.kcb_ini, p.kcb_ini));
        let (t, k) = basal_kcb(&p, p.l_ini, 0.7, 0.7, None);
        assert_eq!((t, k), (p.kcb_ini, p.kcb_ini));
    }

    #[test]
    fn kcb_ramps_through_development() {
        let p = par();
        let step = (p.kcb_mid - p.kcb_ini) / p.l_dev as f64;
        let (t, k) = basal_kcb(&p, p.l_ini + 1, p.kcb_ini, p.kcb_ini, None);
        assert!((t - (p.kcb_ini + step)).abs() < 1e-12);
        assert!((k - (p.kcb_ini + step)).abs() < 1e-12);
    }

    #[test]
    fn kcb_declines_in_late_season() {
        let p = par();
        let s3 = p.l_ini + p.l_dev + p.l_mid;
        let (_, k) = basal_kcb(&p, s3 + 1, p.kcb_mid, p.kcb_mid, None);
        assert!(k < p.kcb_mid);
    }

    #[test]
    fn kcb_settles_at_end_value_after_season() {
        let p = par();
        let s4 = p.l_ini + p.l_dev + p.l_mid + p.l_end;
        let (t, k) = basal_kcb(&p, s4 + 10, 0.6, 0.6, None);
        assert_eq!((t, k), (p.kcb_end, p.kcb_end));
    }

    #[test]
    fn override_replaces_kcb_but_not_tabular() {
        let p = par();
        let (t, k) = basal_kcb(&p, 5, p.kcb_ini, p.kcb_ini, Some(0.95));
        assert_eq!(t, p.kcb_ini);
        assert_eq!(k, 0.95);
        // non-positive override is ignored
        let (_, k) = basal_kcb(&p, 5, p.kcb_ini, p.kcb_ini, Some(0.0));
        assert_eq!(k, p.kcb_ini);
    }

    #[test]
    fn height_never_shrinks() {
        let p = par();
        let h1 = plant_height(&p, 0.6, p.h_ini, None);
        let h2 = plant_height(&p, 0.3, h1, None);
        assert!(h2 >= h1);
    }

    #[test]
    fn root_depth_grows_then_pins_at_max() {
        let p = par();
        let mut zr = p.zr_ini;
        for day in 1..=(p.l_ini + p.l_dev + 20) {
            let next = root_depth(&p, day, zr, false);
            assert!(next >= zr - 1e-12);
            zr = next;
        }
        assert!((zr - p.zr_max).abs() < 1e-9);
    }

    #[test]
    fn puddled_root_depth_is_always_max() {
        let p = par();
        assert_eq!(root_depth(&p, 0, p.zr_ini, true), p.zr_max);
    }

    #[test]
    fn canopy_fraction_clamped_to_099() {
        let p = par();
        let fc = canopy_fraction(&p, 1.19, 1.20, 1.2, None);
        assert!(fc <= 0.99);
        let fc0 = canopy_fraction(&p, p.kcb_ini, 1.20, 0.01, None);
        assert_eq!(fc0, 0.0);
    }
}
