// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the sequencer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of value a track animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Scalar float
    Float,
    /// Integer
    Int,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// Quaternion (x, y, z, w)
    Quat,
}

impl ValueType {
    /// Every value type, in declaration order
    pub const ALL: [ValueType; 5] = [
        ValueType::Float,
        ValueType::Int,
        ValueType::Vec2,
        ValueType::Vec3,
        ValueType::Quat,
    ];

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Vec2 => "Vec2",
            Self::Vec3 => "Vec3",
            Self::Quat => "Quat",
        }
    }

    /// Labels of the components an inspector shows for this type
    pub fn component_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Float | Self::Int => &["value"],
            Self::Vec2 => &["x", "y"],
            Self::Vec3 => &["x", "y", "z"],
            Self::Quat => &["x", "y", "z", "w"],
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value stored in a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Float value
    Float(f32),
    /// Integer value
    Int(i32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl Value {
    /// Zero value of the given type.
    ///
    /// Quaternions start at `(0, 0, 0, 1)`.
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Float => Value::Float(0.0),
            ValueType::Int => Value::Int(0),
            ValueType::Vec2 => Value::Vec2([0.0; 2]),
            ValueType::Vec3 => Value::Vec3([0.0; 3]),
            ValueType::Quat => Value::Quat([0.0, 0.0, 0.0, 1.0]),
        }
    }

    /// The variant tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Int(_) => ValueType::Int,
            Value::Vec2(_) => ValueType::Vec2,
            Value::Vec3(_) => ValueType::Vec3,
            Value::Quat(_) => ValueType::Quat,
        }
    }

    /// Components as floats, in the order of [`ValueType::component_labels`]
    pub fn components(&self) -> Vec<f32> {
        match self {
            Value::Float(v) => vec![*v],
            Value::Int(v) => vec![*v as f32],
            Value::Vec2(v) => v.to_vec(),
            Value::Vec3(v) => v.to_vec(),
            Value::Quat(v) => v.to_vec(),
        }
    }

    /// Copy with one component replaced; `None` if `index` is out of range.
    ///
    /// Integer values round to the nearest integer.
    pub fn with_component(&self, index: usize, component: f32) -> Option<Value> {
        let mut value = *self;
        match &mut value {
            Value::Float(v) if index == 0 => *v = component,
            Value::Int(v) if index == 0 => *v = component.round() as i32,
            Value::Float(_) | Value::Int(_) => return None,
            Value::Vec2(v) => *v.get_mut(index)? = component,
            Value::Vec3(v) => *v.get_mut(index)? = component,
            Value::Quat(v) => *v.get_mut(index)? = component,
        }
        Some(value)
    }
}

/// A keyframe in a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Frame index on the timeline
    pub frame: u32,
    /// Value at this keyframe
    pub value: Value,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(frame: u32, value: Value) -> Self {
        Self {
            id: KeyframeId::new(),
            frame,
            value,
        }
    }

    /// Type of the carried value
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Copy of this keyframe under a fresh ID at another frame
    pub fn duplicated_at(&self, frame: u32) -> Self {
        Self {
            id: KeyframeId::new(),
            frame,
            value: self.value,
        }
    }
}

/// Create a zero-valued keyframe of the given type
pub fn make_keyframe(frame: u32, value_type: ValueType) -> Keyframe {
    Keyframe::new(frame, Value::zero(value_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero(ValueType::Float), Value::Float(0.0));
        assert_eq!(Value::zero(ValueType::Int), Value::Int(0));
        assert_eq!(Value::zero(ValueType::Vec2), Value::Vec2([0.0, 0.0]));
        assert_eq!(Value::zero(ValueType::Vec3), Value::Vec3([0.0, 0.0, 0.0]));
        assert_eq!(Value::zero(ValueType::Quat), Value::Quat([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_every_value_type_round_trips_through_zero() {
        // A variant missing from ALL or from zero() shows up here.
        for value_type in ValueType::ALL {
            let value = Value::zero(value_type);
            assert_eq!(value.value_type(), value_type);
            assert_eq!(
                value.components().len(),
                value_type.component_labels().len(),
                "{value_type} components and labels disagree"
            );
        }
    }

    #[test]
    fn test_with_component() {
        let v = Value::Vec3([1.0, 2.0, 3.0]);
        assert_eq!(v.with_component(1, 9.0), Some(Value::Vec3([1.0, 9.0, 3.0])));
        assert_eq!(v.with_component(3, 9.0), None);
        assert_eq!(Value::Int(1).with_component(0, 2.6), Some(Value::Int(3)));
        assert_eq!(Value::Float(1.0).with_component(1, 2.0), None);
    }

    #[test]
    fn test_make_keyframe() {
        let kf = make_keyframe(12, ValueType::Vec3);
        assert_eq!(kf.frame, 12);
        assert_eq!(kf.value_type(), ValueType::Vec3);
    }

    #[test]
    fn test_duplicated_at_gets_fresh_id() {
        let kf = Keyframe::new(10, Value::Vec3([1.0, 2.0, 3.0]));
        let copy = kf.duplicated_at(15);
        assert_ne!(copy.id, kf.id);
        assert_eq!(copy.frame, 15);
        assert_eq!(copy.value, kf.value);
    }
}
