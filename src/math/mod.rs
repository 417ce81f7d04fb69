pub mod angular;
