use crate::{
    schema::{field_registry::ResolvedField, field_value::FieldValue},
    types::NetId,
};

/// Inputs of one send decision.
#[derive(Clone, Copy, Debug)]
pub struct SendParams {
    /// Seconds since the fields were last checked
    pub dt: f32,
    /// Skip fields equal to their last-sent value
    pub delta_only: bool,
    pub has_ever_sent: bool,
    pub is_owner: bool,
    /// Ignore per-field update rates
    pub force_flush: bool,
}

impl SendParams {
    /// Parameters of the creation sweep: every eligible field, no timers
    pub fn initial(is_owner: bool) -> Self {
        Self {
            dt: 0.0,
            delta_only: false,
            has_ever_sent: false,
            is_owner,
            force_flush: true,
        }
    }
}

/// Send-side state of one field on one channel
#[derive(Clone, Debug, Default)]
pub struct ReplicatedFieldState {
    last_sent: Option<FieldValue>,
    timer: f32,
}

/// Remembers what each field of one object last sent on one channel.
pub struct FieldDeltaTracker {
    fields: Vec<ReplicatedFieldState>,
}

impl FieldDeltaTracker {
    pub fn new(field_count: usize) -> Self {
        Self {
            fields: vec![ReplicatedFieldState::default(); field_count],
        }
    }

    /// Decides whether `field` must be written this sweep.
    ///
    /// A field that passes its condition and rate is re-armed even when its
    /// value turns out unchanged, so the rate caps how often it is checked.
    pub fn should_send(
        &mut self,
        field: &ResolvedField,
        current: &FieldValue,
        params: &SendParams,
        reference_visible: &dyn Fn(NetId) -> bool,
    ) -> bool {
        let Some(state) = self.fields.get_mut(usize::from(field.index)) else {
            return false;
        };

        if !field.condition.allows(params.has_ever_sent, params.is_owner) {
            return false;
        }

        if !params.force_flush {
            state.timer -= params.dt;
            if state.timer > 0.0 {
                return false;
            }
        }
        state.timer = field.update_rate;

        if let Some(referent) = current.as_reference() {
            if !reference_visible(referent) {
                return false;
            }
        }

        if params.delta_only {
            if let Some(last_sent) = &state.last_sent {
                if field.serde.equals(last_sent, current) {
                    return false;
                }
            }
        }

        true
    }

    /// The baseline a delta for this field would be computed against
    pub fn last_sent(&self, field: &ResolvedField) -> Option<&FieldValue> {
        self.fields
            .get(usize::from(field.index))
            .and_then(|state| state.last_sent.as_ref())
    }

    /// Records a successfully written value
    pub fn commit(&mut self, field: &ResolvedField, written: &FieldValue) {
        if let Some(state) = self.fields.get_mut(usize::from(field.index)) {
            state.last_sent = Some(field.serde.copy_value(written));
        }
    }
}
