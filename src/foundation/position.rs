use std::str::FromStr;

use kurbo::Point;

use crate::foundation::error::{CopsError, CopsResult};
use crate::foundation::units::{UnitValue, json_type_name, resolve_units};

/// A named anchor, in the manner of ImageMagick's `-gravity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gravity {
    West,
    North,
    East,
    South,
    Center,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Gravity {
    /// Top-left corner at which a `content_width` x `content_height` box sits inside the
    /// container when anchored at this gravity.
    pub fn resolve(
        self,
        container_width: f64,
        container_height: f64,
        content_width: f64,
        content_height: f64,
    ) -> Point {
        let free_x = container_width - content_width;
        let free_y = container_height - content_height;
        let (x, y) = match self {
            Self::West => (0.0, free_y / 2.0),
            Self::North => (free_x / 2.0, 0.0),
            Self::East => (free_x, free_y / 2.0),
            Self::South => (free_x / 2.0, free_y),
            Self::Center => (free_x / 2.0, free_y / 2.0),
            Self::NorthWest => (0.0, 0.0),
            Self::NorthEast => (free_x, 0.0),
            Self::SouthWest => (0.0, free_y),
            Self::SouthEast => (free_x, free_y),
        };
        Point::new(x, y)
    }
}

impl FromStr for Gravity {
    type Err = CopsError;

    fn from_str(s: &str) -> CopsResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "west" | "left" => Ok(Self::West),
            "north" | "top" => Ok(Self::North),
            "east" | "right" => Ok(Self::East),
            "south" | "bottom" => Ok(Self::South),
            "center" | "middle" => Ok(Self::Center),
            "northwest" | "topleft" | "top-left" => Ok(Self::NorthWest),
            "northeast" | "topright" | "top-right" => Ok(Self::NorthEast),
            "southwest" | "bottomleft" | "bottom-left" => Ok(Self::SouthWest),
            "southeast" | "bottomright" | "bottom-right" => Ok(Self::SouthEast),
            _ => Err(CopsError::invalid_gravity(s)),
        }
    }
}

/// Resolve a gravity keyword directly; unknown keywords fail with [`CopsError::InvalidGravity`].
pub fn resolve_gravity(
    keyword: &str,
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> CopsResult<Point> {
    let gravity: Gravity = keyword.parse()?;
    Ok(gravity.resolve(
        container_width,
        container_height,
        content_width,
        content_height,
    ))
}

#[derive(Clone, Debug, PartialEq)]
pub enum HorizontalOffset {
    X(UnitValue),
    Left(UnitValue),
    /// Measured from the right edge.
    Right(UnitValue),
}

#[derive(Clone, Debug, PartialEq)]
pub enum VerticalOffset {
    Y(UnitValue),
    Top(UnitValue),
    /// Measured from the bottom edge.
    Bottom(UnitValue),
}

/// Explicit placement. An axis left as `None` resolves to 0, not to the center.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Offset {
    pub horizontal: Option<HorizontalOffset>,
    pub vertical: Option<VerticalOffset>,
}

impl Offset {
    pub fn xy(x: impl Into<UnitValue>, y: impl Into<UnitValue>) -> Self {
        Self {
            horizontal: Some(HorizontalOffset::X(x.into())),
            vertical: Some(VerticalOffset::Y(y.into())),
        }
    }

    pub fn with_horizontal(mut self, h: HorizontalOffset) -> Self {
        self.horizontal = Some(h);
        self
    }

    pub fn with_vertical(mut self, v: VerticalOffset) -> Self {
        self.vertical = Some(v);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PositionSpec {
    Gravity(Gravity),
    Offset(Offset),
}

impl Default for PositionSpec {
    fn default() -> Self {
        Self::Gravity(Gravity::Center)
    }
}

impl From<Gravity> for PositionSpec {
    fn from(g: Gravity) -> Self {
        Self::Gravity(g)
    }
}

impl From<Offset> for PositionSpec {
    fn from(o: Offset) -> Self {
        Self::Offset(o)
    }
}

impl FromStr for PositionSpec {
    type Err = CopsError;

    /// Accepts a gravity keyword or an `x,y` pair such as `10,20` or `50%,75%`.
    fn from_str(s: &str) -> CopsResult<Self> {
        match s.split_once(',') {
            Some((x, y)) => Ok(Self::Offset(Offset::xy(x.trim(), y.trim()))),
            None => Ok(Self::Gravity(s.trim().parse()?)),
        }
    }
}

impl TryFrom<&serde_json::Value> for PositionSpec {
    type Error = CopsError;

    fn try_from(value: &serde_json::Value) -> CopsResult<Self> {
        match value {
            serde_json::Value::String(s) => s.parse(),
            serde_json::Value::Object(map) => {
                let mut offset = Offset::default();
                for (key, v) in map {
                    let unit = UnitValue::try_from(v)?;
                    let (slot_taken, axis) = match key.as_str() {
                        "x" | "left" | "right" => (offset.horizontal.is_some(), "horizontal"),
                        "y" | "top" | "bottom" => (offset.vertical.is_some(), "vertical"),
                        other => {
                            return Err(CopsError::invalid_position(format!(
                                "unknown position key '{other}'"
                            )));
                        }
                    };
                    if slot_taken {
                        return Err(CopsError::invalid_position(format!(
                            "more than one {axis} key in position"
                        )));
                    }
                    match key.as_str() {
                        "x" => offset.horizontal = Some(HorizontalOffset::X(unit)),
                        "left" => offset.horizontal = Some(HorizontalOffset::Left(unit)),
                        "right" => offset.horizontal = Some(HorizontalOffset::Right(unit)),
                        "y" => offset.vertical = Some(VerticalOffset::Y(unit)),
                        "top" => offset.vertical = Some(VerticalOffset::Top(unit)),
                        _ => offset.vertical = Some(VerticalOffset::Bottom(unit)),
                    }
                }
                Ok(Self::Offset(offset))
            }
            other => Err(CopsError::invalid_position(json_type_name(other))),
        }
    }
}

/// Resolve a placement to an absolute point inside a `container_width` x `container_height` box.
///
/// Gravity keywords take the content box into account; offsets do not: `right`/`bottom` resolve
/// to `container - value`, everything else resolves directly, and unset axes resolve to 0.
pub fn resolve_position(
    spec: &PositionSpec,
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> CopsResult<Point> {
    match spec {
        PositionSpec::Gravity(g) => Ok(g.resolve(
            container_width,
            container_height,
            content_width,
            content_height,
        )),
        PositionSpec::Offset(offset) => {
            let x = match &offset.horizontal {
                None => 0.0,
                Some(HorizontalOffset::X(v) | HorizontalOffset::Left(v)) => {
                    resolve_units(v, container_width)?
                }
                Some(HorizontalOffset::Right(v)) => {
                    container_width - resolve_units(v, container_width)?
                }
            };
            let y = match &offset.vertical {
                None => 0.0,
                Some(VerticalOffset::Y(v) | VerticalOffset::Top(v)) => {
                    resolve_units(v, container_height)?
                }
                Some(VerticalOffset::Bottom(v)) => {
                    container_height - resolve_units(v, container_height)?
                }
            };
            Ok(Point::new(x, y))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/position.rs"]
mod tests;
