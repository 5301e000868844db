//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                  |
//! |--------------|-------------------|------------------------------|
//! | `hardware`   | GpioPort          | GPIO bank (rppal or sim)     |
//! |              | LightSensorPort   | Photocell RC circuit         |
//! | `log_sink`   | EventSink         | `log` facade                 |
//! | `prompt`     | OperatorPrompt    | stdin / stdout               |
//! | `state_file` | StateStorePort    | Text state file on disk      |
//! | `time`       | ClockPort         | Local wall clock             |

pub mod hardware;
pub mod log_sink;
pub mod prompt;
pub mod state_file;
pub mod time;
