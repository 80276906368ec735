//! Minimal WKT/EWKT reader for the polygon types the store holds.
//!
//! Grammar accepted (keywords are case-insensitive):
//!
//! ```text
//! ewkt         := [ "SRID=" int ";" ] geometry
//! geometry     := "POLYGON" [ "Z" ] polygon_text
//!               | "MULTIPOLYGON" [ "Z" ] "(" polygon_text { "," polygon_text } ")"
//! polygon_text := "EMPTY" | "(" ring { "," ring } ")"
//! ring         := "(" position { "," position } ")"
//! position     := number number [ number ]
//! ```

use crate::geometry::{Geometry, GeometryError, PolygonRings, Position, Ring, WGS84_SRID};

pub(crate) fn parse(input: &str) -> Result<Geometry, GeometryError> {
  let mut p = Parser { src: input, pos: 0 };
  p.skip_ws();

  if p.eat_keyword("SRID") {
    p.expect(b'=')?;
    let srid = p.integer()?;
    if srid != WGS84_SRID {
      return Err(GeometryError::UnsupportedSrid(srid));
    }
    p.expect(b';')?;
  }

  let keyword = p.keyword()?;
  p.dimension()?;

  let geom = match keyword.as_str() {
    "POLYGON" => Geometry::Polygon(p.polygon()?),
    "MULTIPOLYGON" => {
      if p.eat_keyword("EMPTY") {
        return Err(GeometryError::Empty);
      }
      p.expect(b'(')?;
      let mut polygons = vec![p.polygon()?];
      while p.eat(b',') {
        polygons.push(p.polygon()?);
      }
      p.expect(b')')?;
      Geometry::MultiPolygon(polygons)
    }
    other => return Err(p.error(format!("unsupported geometry type {other:?}"))),
  };

  p.skip_ws();
  if p.pos != p.src.len() {
    return Err(p.error("trailing input".into()));
  }
  Ok(geom)
}

struct Parser<'a> {
  src: &'a str,
  pos: usize,
}

impl Parser<'_> {
  fn rest(&self) -> &str { &self.src[self.pos..] }

  fn error(&self, message: String) -> GeometryError {
    GeometryError::Wkt { offset: self.pos, message }
  }

  fn skip_ws(&mut self) {
    let trimmed = self.rest().trim_start();
    self.pos = self.src.len() - trimmed.len();
  }

  fn peek(&mut self) -> Option<u8> {
    self.skip_ws();
    self.rest().as_bytes().first().copied()
  }

  fn eat(&mut self, byte: u8) -> bool {
    if self.peek() == Some(byte) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn expect(&mut self, byte: u8) -> Result<(), GeometryError> {
    if self.eat(byte) {
      Ok(())
    } else {
      Err(self.error(format!("expected {:?}", byte as char)))
    }
  }

  fn peek_keyword(&mut self) -> &str {
    self.skip_ws();
    let rest = self.rest();
    let end = rest
      .find(|c: char| !c.is_ascii_alphabetic())
      .unwrap_or(rest.len());
    &rest[..end]
  }

  fn eat_keyword(&mut self, keyword: &str) -> bool {
    let word = self.peek_keyword();
    let (len, matched) = (word.len(), word.eq_ignore_ascii_case(keyword));
    if matched {
      self.pos += len;
      true
    } else {
      false
    }
  }

  fn keyword(&mut self) -> Result<String, GeometryError> {
    let word = self.peek_keyword().to_ascii_uppercase();
    if word.is_empty() {
      return Err(self.error("expected geometry type".into()));
    }
    self.pos += word.len();
    Ok(word)
  }

  /// Accept an optional `Z` tag. Measured (`M`, `ZM`) geometries are refused.
  fn dimension(&mut self) -> Result<(), GeometryError> {
    let word = self.peek_keyword().to_ascii_uppercase();
    match word.as_str() {
      "Z" => {
        self.pos += 1;
        Ok(())
      }
      "M" | "ZM" => Err(self.error("measured coordinates are not supported".into())),
      _ => Ok(()),
    }
  }

  fn polygon(&mut self) -> Result<PolygonRings, GeometryError> {
    if self.eat_keyword("EMPTY") {
      return Err(GeometryError::Empty);
    }
    self.expect(b'(')?;
    let mut rings = vec![self.ring()?];
    while self.eat(b',') {
      rings.push(self.ring()?);
    }
    self.expect(b')')?;
    Ok(rings)
  }

  fn ring(&mut self) -> Result<Ring, GeometryError> {
    self.expect(b'(')?;
    let mut positions = vec![self.position()?];
    while self.eat(b',') {
      positions.push(self.position()?);
    }
    self.expect(b')')?;
    Ok(positions)
  }

  fn position(&mut self) -> Result<Position, GeometryError> {
    let mut ordinates = vec![self.number()?, self.number()?];
    if !matches!(self.peek(), Some(b',' | b')')) {
      ordinates.push(self.number()?);
    }
    Ok(ordinates)
  }

  fn token(&mut self) -> &str {
    self.skip_ws();
    let rest = self.rest();
    let end = rest
      .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
      .unwrap_or(rest.len());
    &rest[..end]
  }

  fn number(&mut self) -> Result<f64, GeometryError> {
    let token = self.token().to_owned();
    let value = token
      .parse::<f64>()
      .map_err(|_| self.error(format!("expected number, found {token:?}")))?;
    self.pos += token.len();
    Ok(value)
  }

  fn integer(&mut self) -> Result<i64, GeometryError> {
    let token = self.token().to_owned();
    let value = token
      .parse::<i64>()
      .map_err(|_| self.error(format!("expected integer, found {token:?}")))?;
    self.pos += token.len();
    Ok(value)
  }
}
