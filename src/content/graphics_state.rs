//! Graphics and text state tracked while running a content stream.

use crate::fonts::Font;
use std::rc::Rc;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Points are row vectors, so `m1.multiply(&m2)` applies `m1` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f64,
    /// Rotation/skew component
    pub b: f64,
    /// Rotation/skew component
    pub c: f64,
    /// Vertical scaling component
    pub d: f64,
    /// Horizontal translation
    pub e: f64,
    /// Vertical translation
    pub f: f64,
}

impl Matrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix from its six components.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Translation by `(tx, ty)`.
    ///
    /// ```
    /// use pdftext::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 20.0);
    /// assert_eq!(m.transform_point(5.0, 10.0), (15.0, 30.0));
    /// ```
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` followed by `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Apply the matrix to a point.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics state parameters that affect text placement.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Text matrix (Tm)
    pub text_matrix: Matrix,
    /// Text line matrix (Tlm)
    pub text_line_matrix: Matrix,
    /// Character spacing (Tc)
    pub char_space: f64,
    /// Word spacing (Tw)
    pub word_space: f64,
    /// Horizontal scaling as a fraction (Tz / 100)
    pub horizontal_scaling: f64,
    /// Text leading (TL)
    pub leading: f64,
    /// Current font (Tf)
    pub font: Rc<Font>,
    /// Current font size (Tf)
    pub font_size: f64,
    /// Text rise (Ts)
    pub text_rise: f64,
    /// Text rendering mode (Tr)
    pub render_mode: i64,
}

impl GraphicsState {
    /// Initial state at the start of a page.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            font: Rc::new(Font::default()),
            font_size: 0.0,
            text_rise: 0.0,
            render_mode: 0,
        }
    }

    /// Text rendering matrix: `[Tfs*Th 0 0 Tfs 0 Trise] x Tm x CTM`.
    pub fn text_rendering_matrix(&self) -> Matrix {
        Matrix::new(
            self.font_size * self.horizontal_scaling,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.text_rise,
        )
        .multiply(&self.text_matrix)
        .multiply(&self.ctm)
    }

    /// Move to the start of the next line offset by `(tx, ty)` (`Td`).
    pub fn move_text_line(&mut self, tx: f64, ty: f64) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// Move to the next line using the leading (`T*`).
    pub fn next_line(&mut self) {
        self.move_text_line(0.0, -self.leading);
    }

    /// Advance the text matrix horizontally by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Current state plus the states saved by `q`.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Stack holding only the initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    /// The current state, mutably.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// Save a copy of the current state (`q`).
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Restore the last saved state (`Q`). Without a saved state nothing
    /// changes.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => log::warn!("Q without matching q"),
        }
    }

    /// Number of states, counting the current one.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }
}
