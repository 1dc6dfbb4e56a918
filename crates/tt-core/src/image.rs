use crate::Error;

/// Owned row-major frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }
}

/// Borrowed view over a strided frame buffer.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Returns the `width x height` window whose top-left pixel is `(x, y)`.
    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        let out_of_bounds = || Error::OutOfBounds {
            rows: (y, y.saturating_add(height)),
            cols: (x, x.saturating_add(width)),
            width: self.width,
            height: self.height,
        };

        if x > self.width
            || y > self.height
            || width > (self.width - x)
            || height > (self.height - y)
        {
            return Err(out_of_bounds());
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or_else(out_of_bounds)?;
        let min_len = min_required_len(width, height, self.stride).ok_or_else(out_of_bounds)?;
        let tail = self.data.get(start..).ok_or_else(out_of_bounds)?;

        if tail.len() < min_len {
            return Err(out_of_bounds());
        }

        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageView};
    use crate::Error;

    #[test]
    fn padded_rows_skip_stride_tail() {
        let data = vec![1u16, 2, 3, 99, 4, 5, 6, 88];
        let view = ImageView::from_slice(3, 2, 4, &data).expect("valid view");

        assert_eq!(view.row(0), &[1, 2, 3]);
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(
            ImageView::from_slice(3, 2, 4, &data[..6]).unwrap_err(),
            Error::SizeMismatch {
                expected: 7,
                actual: 6
            }
        );
    }

    #[test]
    fn subview_of_padded_frame() {
        let data = vec![
            10u16, 11, 12, 13, 99, // row 0
            20, 21, 22, 23, 98, // row 1
            30, 31, 32, 33, 97, // row 2
        ];
        let parent = ImageView::from_slice(4, 3, 5, &data).expect("valid parent");
        let sub = parent.subview(1, 1, 3, 2).expect("valid subview");

        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.row(0), &[21, 22, 23]);
        assert_eq!(sub.row(1), &[31, 32, 33]);
    }

    #[test]
    fn subview_outside_frame_reports_region() {
        let img = Image::new_fill(4, 3, 0u16);
        let err = img.as_view().subview(2, 1, 3, 2).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfBounds {
                rows: (1, 3),
                cols: (2, 5),
                width: 4,
                height: 3,
            }
        );
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Image::from_vec(3, 2, vec![0u8; 5]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 6,
                actual: 5
            }
        );
    }
}
