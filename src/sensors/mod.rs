//! Sensor drivers.  One analog input feeds this system: the ambient
//! light photoresistor divider on ADC1.

pub mod light;
