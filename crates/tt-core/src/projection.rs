use crate::{Error, ImageView, Span};

/// Sums `rows` down each column of `cols`, producing one value per column.
pub fn project_columns<T>(img: &ImageView<'_, T>, rows: Span, cols: Span) -> Result<Vec<f64>, Error>
where
    T: Copy + Into<f64>,
{
    let mut out = Vec::with_capacity(cols.len());
    project_columns_into(img, rows, cols, &mut out)?;
    Ok(out)
}

/// Buffer-reusing form of [`project_columns`]; `out` is resized to
/// `cols.len()`.
pub fn project_columns_into<T>(
    img: &ImageView<'_, T>,
    rows: Span,
    cols: Span,
    out: &mut Vec<f64>,
) -> Result<(), Error>
where
    T: Copy + Into<f64>,
{
    rows.validate()?;
    cols.validate()?;
    let region = img.subview(cols.lo, rows.lo, cols.len(), rows.len())?;

    out.clear();
    out.resize(cols.len(), 0.0);
    for y in 0..region.height() {
        for (acc, &px) in out.iter_mut().zip(region.row(y)) {
            *acc += px.into();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::project_columns;
    use crate::{Error, Image, Span};

    #[test]
    fn sums_rows_per_column() {
        let img = Image::from_vec(
            4,
            3,
            vec![
                1u16, 2, 3, 4, //
                10, 20, 30, 40, //
                100, 200, 300, 400,
            ],
        )
        .expect("valid image");

        let proj = project_columns(&img.as_view(), Span::new(1, 3), Span::new(1, 3))
            .expect("in bounds");
        assert_eq!(proj, vec![220.0, 330.0]);
    }

    #[test]
    fn rejects_region_outside_frame() {
        let img = Image::new_fill(4, 3, 1u8);
        let err = project_columns(&img.as_view(), Span::new(0, 4), Span::new(0, 2)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { height: 3, .. }));
    }

    #[test]
    fn float_frames_project_too() {
        let img = Image::from_vec(2, 2, vec![0.5f32, 1.5, 2.0, 4.0]).expect("valid image");
        let proj =
            project_columns(&img.as_view(), Span::new(0, 2), Span::new(0, 2)).expect("in bounds");
        assert_eq!(proj, vec![2.5, 5.5]);
    }
}
