//! The audio backend: resolves device ids to native handles, reads a
//! device's nominal sample rate for strict startup validation, and builds
//! the input/output cpal streams the engine's render path rides on.
//!
//! Device ids here follow the same convention as `sonido_io`'s
//! enumeration: the position of the device in `cpal`'s device iterator
//! for that scope, re-resolved on every call rather than cached.

use cpal::traits::{DeviceTrait, HostTrait};

use sonido_core::error::{HostError, HostResult};

/// Which scope a device lookup or stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Audio input (capture).
    Input,
    /// Audio output (playback).
    Output,
}

/// Type-erased handle to a running cpal stream. Dropping it stops the
/// stream; the engine holds one for input and one for output while
/// Running.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wraps a backend-specific stream object, keeping it alive until
    /// this handle drops.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self { _inner: Box::new(stream) }
    }
}

/// Resolves audio devices and reads their nominal capabilities via cpal.
pub struct CpalBackend {
    host: cpal::Host,
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalBackend {
    /// Opens the platform's default cpal host.
    #[must_use]
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Resolves `device_id` (the enumeration-order index `sonido_io`
    /// reports) to a concrete cpal device in `scope`. `None` resolves to
    /// the scope's system default.
    pub fn resolve_device(&self, device_id: Option<u32>, scope: Scope) -> HostResult<cpal::Device> {
        match device_id {
            None => self.default_device(scope),
            Some(id) => self
                .devices(scope)?
                .nth(id as usize)
                .ok_or(HostError::DeviceNotFound { id }),
        }
    }

    fn default_device(&self, scope: Scope) -> HostResult<cpal::Device> {
        let device = match scope {
            Scope::Input => self.host.default_input_device(),
            Scope::Output => self.host.default_output_device(),
        };
        device.ok_or(HostError::DeviceNotFound { id: 0 })
    }

    fn devices(&self, scope: Scope) -> HostResult<Box<dyn Iterator<Item = cpal::Device>>> {
        let devices = match scope {
            Scope::Input => self.host.input_devices(),
            Scope::Output => self.host.output_devices(),
        };
        match devices {
            Ok(iter) => Ok(Box::new(iter)),
            Err(_) => Ok(Box::new(std::iter::empty())),
        }
    }

    /// Reads the device's own native input channel count, used to size the
    /// input stream correctly regardless of the engine's stereo output.
    pub fn input_channel_count(&self, device: &cpal::Device) -> HostResult<u16> {
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());
        device
            .default_input_config()
            .map(|c| c.channels())
            .map_err(|_| HostError::SampleRateCheckFailed { device: name })
    }

    /// Reads the device's nominal sample rate — the rate cpal reports as
    /// its default stream config, used for the strict sample-rate check
    /// at startup (§4.3 step 3).
    pub fn nominal_sample_rate(&self, device: &cpal::Device, scope: Scope) -> HostResult<u32> {
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());
        let config = match scope {
            Scope::Input => device.default_input_config(),
            Scope::Output => device.default_output_config(),
        };
        config
            .map(|c| c.sample_rate().0)
            .map_err(|_| HostError::SampleRateCheckFailed { device: name })
    }

    /// Builds the output stream driving `callback` on cpal's realtime
    /// thread, at `sample_rate`/`buffer_size`, stereo.
    pub fn build_output_stream(
        &self,
        device: &cpal::Device,
        sample_rate: u32,
        buffer_size: u32,
        mut callback: impl FnMut(&mut [f32]) + Send + 'static,
        mut error_callback: impl FnMut(&str) + Send + 'static,
    ) -> HostResult<StreamHandle> {
        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(buffer_size),
        };
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| callback(data),
                move |err| error_callback(&err.to_string()),
                None,
            )
            .map_err(|e| HostError::EngineStartFailed { reason: e.to_string() })?;
        cpal::traits::StreamTrait::play(&stream)
            .map_err(|e| HostError::EngineStartFailed { reason: e.to_string() })?;
        tracing::info!(sample_rate, buffer_size, "output stream started");
        Ok(StreamHandle::new(stream))
    }

    /// Builds the input stream feeding captured samples to `callback`, at
    /// the device's own `channels` count (not necessarily stereo).
    pub fn build_input_stream(
        &self,
        device: &cpal::Device,
        sample_rate: u32,
        buffer_size: u32,
        channels: u16,
        mut callback: impl FnMut(&[f32]) + Send + 'static,
        mut error_callback: impl FnMut(&str) + Send + 'static,
    ) -> HostResult<StreamHandle> {
        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(buffer_size),
        };
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| callback(data),
                move |err| error_callback(&err.to_string()),
                None,
            )
            .map_err(|e| HostError::EngineStartFailed { reason: e.to_string() })?;
        cpal::traits::StreamTrait::play(&stream)
            .map_err(|e| HostError::EngineStartFailed { reason: e.to_string() })?;
        tracing::info!(sample_rate, buffer_size, channels, "input stream started");
        Ok(StreamHandle::new(stream))
    }
}
