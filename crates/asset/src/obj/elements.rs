//! One parser per OBJ record kind.
//!
//! Each returns `Ok(false)` without consuming anything when the record's keyword
//! is not at the cursor. Passing `None` as the output validates and skips the
//! record without storing it.

use corelib::{Vec2, Vec3};
use log::debug;

use super::{Face, RawVertexIndex, scanner::Scanner};
use crate::error::ObjError;

/// `v x y z [w]`, stored as `(x/w, y/w, z/w)`.
pub(crate) fn parse_position(
    sc: &mut Scanner<'_>,
    out: Option<&mut Vec<Vec3>>,
) -> Result<bool, ObjError> {
    if !sc.accept_literal("v ") {
        return Ok(false);
    }
    let x = expect_float(sc, "x coordinate")?;
    let y = expect_float(sc, "y coordinate")?;
    let z = expect_float(sc, "z coordinate")?;
    sc.skip_blanks();
    let w_at = sc.location();
    let w = sc.parse_float().unwrap_or(1.0);
    if w == 0.0 {
        return Err(ObjError::ZeroHomogeneous { location: w_at });
    }
    expect_newline(sc)?;

    if let Some(out) = out {
        out.push(Vec3::new(x / w, y / w, z / w));
    }
    Ok(true)
}

/// `vt u v [w]`; the third component is read and dropped.
pub(crate) fn parse_tex_coord(
    sc: &mut Scanner<'_>,
    out: Option<&mut Vec<Vec2>>,
) -> Result<bool, ObjError> {
    if !sc.accept_literal("vt ") {
        return Ok(false);
    }
    let u = expect_float(sc, "u coordinate")?;
    let v = expect_float(sc, "v coordinate")?;
    let _ = sc.parse_float();
    expect_newline(sc)?;

    if let Some(out) = out {
        out.push(Vec2::new(u, v));
    }
    Ok(true)
}

/// `vn x y z`.
pub(crate) fn parse_normal(
    sc: &mut Scanner<'_>,
    out: Option<&mut Vec<Vec3>>,
) -> Result<bool, ObjError> {
    if !sc.accept_literal("vn ") {
        return Ok(false);
    }
    let x = expect_float(sc, "nx coordinate")?;
    let y = expect_float(sc, "ny coordinate")?;
    let z = expect_float(sc, "nz coordinate")?;
    expect_newline(sc)?;

    if let Some(out) = out {
        out.push(Vec3::new(x, y, z));
    }
    Ok(true)
}

/// `f c0 c1 c2 ...` with at least three corners.
///
/// The face ends at the first token that is not a corner. Corners are counted
/// ahead of time so the stored face is allocated exactly once.
pub(crate) fn parse_face(
    sc: &mut Scanner<'_>,
    out: Option<&mut Vec<Face>>,
) -> Result<bool, ObjError> {
    let location = sc.location();
    // `f` must stand alone: `foo` is some other statement.
    let keyword = sc.peek() == Some(b'f')
        && matches!(
            sc.peek_at(1),
            None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'0'..=b'9')
        );
    if !keyword || !sc.accept_literal("f") {
        return Ok(false);
    }

    sc.mark();
    let mut count = 0;
    while parse_corner(sc)?.is_some() {
        count += 1;
    }
    if count < 3 {
        return Err(ObjError::TooFewVertices { location, count });
    }

    if let Some(out) = out {
        sc.restore();
        let mut corners = Vec::with_capacity(count);
        for _ in 0..count {
            // The lookahead above already walked these corners.
            if let Some(corner) = parse_corner(sc)? {
                corners.push(corner);
            }
        }
        debug!("face with {} corners at {}", corners.len(), location);
        out.push(Face { corners, location });
    }
    Ok(true)
}

/// One `p`, `p/t`, `p//n` or `p/t/n` descriptor. `Ok(None)` when no index starts here.
fn parse_corner(sc: &mut Scanner<'_>) -> Result<Option<RawVertexIndex>, ObjError> {
    sc.skip_blanks();
    let at = sc.location();
    let Some(position) = sc.parse_unsigned() else {
        return Ok(None);
    };
    let position = zero_based(position, at)?;

    let mut tex_coord = None;
    let mut normal = None;
    if sc.accept_literal("/") {
        if sc.accept_literal("/") {
            normal = Some(expect_index(sc)?);
        } else {
            tex_coord = Some(expect_index(sc)?);
            if sc.accept_literal("/") {
                normal = Some(expect_index(sc)?);
            }
        }
    }

    Ok(Some(RawVertexIndex {
        position,
        tex_coord,
        normal,
    }))
}

fn expect_index(sc: &mut Scanner<'_>) -> Result<usize, ObjError> {
    let at = sc.location();
    let raw = sc.parse_unsigned().ok_or(ObjError::MalformedNumber {
        location: at,
        expected: "vertex index",
    })?;
    zero_based(raw, at)
}

fn zero_based(raw: u32, at: crate::Location) -> Result<usize, ObjError> {
    (raw as usize)
        .checked_sub(1)
        .ok_or(ObjError::ZeroIndex { location: at })
}

fn expect_float(sc: &mut Scanner<'_>, expected: &'static str) -> Result<f32, ObjError> {
    sc.skip_blanks();
    let at = sc.location();
    sc.parse_float().ok_or(ObjError::MalformedNumber {
        location: at,
        expected,
    })
}

fn expect_newline(sc: &mut Scanner<'_>) -> Result<(), ObjError> {
    sc.skip_blanks();
    if sc.accept_literal("\n") || sc.accept_literal("\r\n") {
        Ok(())
    } else {
        Err(ObjError::MissingNewline {
            location: sc.location(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_with_homogeneous_divide() {
        let mut sc = Scanner::new(b"v 2 4 6 2\n");
        let mut out = Vec::new();
        assert_eq!(parse_position(&mut sc, Some(&mut out)), Ok(true));
        assert_eq!(out, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert!(sc.is_at_end());
    }

    #[test]
    fn position_without_w_defaults_to_one() {
        let mut sc = Scanner::new(b"v 1 -2.5 3e1  \n");
        let mut out = Vec::new();
        parse_position(&mut sc, Some(&mut out)).unwrap();
        assert_eq!(out, vec![Vec3::new(1.0, -2.5, 30.0)]);
    }

    #[test]
    fn position_with_hex_coordinates() {
        let mut sc = Scanner::new(b"v 0x10 -0x1p-1 0 0x2\n");
        let mut out = Vec::new();
        parse_position(&mut sc, Some(&mut out)).unwrap();
        assert_eq!(out, vec![Vec3::new(8.0, -0.25, 0.0)]);
    }

    #[test]
    fn position_with_zero_w_fails() {
        let mut sc = Scanner::new(b"v 1 2 3 0\n");
        let err = parse_position(&mut sc, None).unwrap_err();
        assert_eq!(
            err,
            ObjError::ZeroHomogeneous {
                location: crate::Location {
                    line: 1,
                    column: 9,
                    offset: 8
                }
            }
        );
    }

    #[test]
    fn position_requires_newline() {
        let mut sc = Scanner::new(b"v 1 2 3");
        assert!(matches!(
            parse_position(&mut sc, None),
            Err(ObjError::MissingNewline { .. })
        ));
        let mut sc = Scanner::new(b"v 1 2 3 4 5\n");
        assert!(matches!(
            parse_position(&mut sc, None),
            Err(ObjError::MissingNewline { .. })
        ));
    }

    #[test]
    fn position_with_missing_coordinate() {
        let mut sc = Scanner::new(b"v 1 2\n");
        assert_eq!(
            parse_position(&mut sc, None),
            Err(ObjError::MalformedNumber {
                location: crate::Location {
                    line: 1,
                    column: 6,
                    offset: 5
                },
                expected: "z coordinate"
            })
        );
    }

    #[test]
    fn other_keywords_do_not_match() {
        let mut sc = Scanner::new(b"vt 0 0\n");
        assert_eq!(parse_position(&mut sc, None), Ok(false));
        assert_eq!(parse_normal(&mut sc, None), Ok(false));
        assert_eq!(parse_face(&mut sc, None), Ok(false));
        assert_eq!(sc.location().offset, 0);
    }

    #[test]
    fn tex_coord_with_and_without_third_value() {
        let mut sc = Scanner::new(b"vt 0.5 0.25\nvt 1 0 0\n");
        let mut out = Vec::new();
        assert_eq!(parse_tex_coord(&mut sc, Some(&mut out)), Ok(true));
        assert_eq!(parse_tex_coord(&mut sc, Some(&mut out)), Ok(true));
        assert_eq!(out, vec![Vec2::new(0.5, 0.25), Vec2::new(1.0, 0.0)]);
    }

    #[test]
    fn normal_record() {
        let mut sc = Scanner::new(b"vn 0 0 -1\r\n");
        let mut out = Vec::new();
        assert_eq!(parse_normal(&mut sc, Some(&mut out)), Ok(true));
        assert_eq!(out, vec![Vec3::new(0.0, 0.0, -1.0)]);
        assert!(sc.is_at_end());
    }

    #[test]
    fn face_corner_forms() {
        let mut sc = Scanner::new(b"f 1 2/3 4//5 6/7/8\n");
        let mut out = Vec::new();
        assert_eq!(parse_face(&mut sc, Some(&mut out)), Ok(true));
        let corners = &out[0].corners;
        assert_eq!(corners.capacity(), 4);
        assert_eq!(
            corners,
            &vec![
                RawVertexIndex {
                    position: 0,
                    tex_coord: None,
                    normal: None
                },
                RawVertexIndex {
                    position: 1,
                    tex_coord: Some(2),
                    normal: None
                },
                RawVertexIndex {
                    position: 3,
                    tex_coord: None,
                    normal: Some(4)
                },
                RawVertexIndex {
                    position: 5,
                    tex_coord: Some(6),
                    normal: Some(7)
                },
            ]
        );
        assert_eq!(sc.peek(), Some(b'\n'));
    }

    #[test]
    fn face_without_output_skips_record() {
        let mut sc = Scanner::new(b"f 1 2 3 4\nf 1 2 3\n");
        assert_eq!(parse_face(&mut sc, None), Ok(true));
        sc.skip_blanks_and_comments();
        assert_eq!(sc.location().line, 2);
        assert_eq!(parse_face(&mut sc, None), Ok(true));
    }

    #[test]
    fn face_with_two_corners_fails() {
        let mut sc = Scanner::new(b"f 1 2\n");
        assert_eq!(
            parse_face(&mut sc, None),
            Err(ObjError::TooFewVertices {
                location: crate::Location::START,
                count: 2
            })
        );
    }

    #[test]
    fn face_with_zero_index_fails() {
        let mut sc = Scanner::new(b"f 1 0 2\n");
        assert!(matches!(
            parse_face(&mut sc, None),
            Err(ObjError::ZeroIndex { .. })
        ));
    }

    #[test]
    fn blanks_allowed_before_corner_indices() {
        let mut sc = Scanner::new(b"f 1/ 1 2/ 2 3/ 3\n");
        let mut out = Vec::new();
        assert_eq!(parse_face(&mut sc, Some(&mut out)), Ok(true));
        let tex: Vec<_> = out[0].corners.iter().map(|c| c.tex_coord).collect();
        assert_eq!(tex, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(sc.peek(), Some(b'\n'));
    }

    #[test]
    fn face_keyword_needs_a_separator() {
        let mut sc = Scanner::new(b"foo 1 2 3\n");
        assert_eq!(parse_face(&mut sc, None), Ok(false));
        assert_eq!(sc.location().offset, 0);

        let mut sc = Scanner::new(b"f1 2 3\n");
        assert_eq!(parse_face(&mut sc, None), Ok(true));
    }

    #[test]
    fn face_with_dangling_slash_fails() {
        let mut sc = Scanner::new(b"f 1 2 3/\n");
        assert!(matches!(
            parse_face(&mut sc, None),
            Err(ObjError::MalformedNumber {
                expected: "vertex index",
                ..
            })
        ));
    }
}
