//! Ambient weather effect.
//!
//! The core only tracks which effect is active and a running frame
//! counter the host uses to phase its particles; rendering is the host's
//! concern.

use serde::{Deserialize, Serialize};

use fable_data::command::WeatherType;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(rename = "weatherType")]
    weather_type: WeatherType,
    #[serde(default)]
    power: i32,
    #[serde(skip)]
    frame: u64,
}

impl Weather {
    pub fn set(&mut self, weather_type: WeatherType, power: i32) {
        self.weather_type = weather_type;
        self.power = power;
        self.frame = 0;
    }

    pub fn weather_type(&self) -> WeatherType {
        self.weather_type
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn update(&mut self) {
        if self.weather_type != WeatherType::None {
            self.frame = self.frame.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames_only_while_active() {
        let mut weather = Weather::default();
        weather.update();
        assert_eq!(weather.frame(), 0);
        weather.set(WeatherType::Rain, 5);
        weather.update();
        weather.update();
        assert_eq!(weather.frame(), 2);
        assert_eq!(weather.power(), 5);
    }
}
