use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

/// A set of named string fields a [`Form`] can edit.
pub trait FormValues: Clone {
    type Field: Copy + Ord + fmt::Debug;

    fn field(&self, field: Self::Field) -> &str;
    fn set_field(&mut self, field: Self::Field, value: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    messages: BTreeMap<F, String>,
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            messages: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.messages.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on {} field(s)", .0.len())]
pub struct ValidationError<F: Ord + Copy + fmt::Debug>(pub FieldErrors<F>);

type Validator<V> = Rc<dyn Fn(&V) -> FieldErrors<<V as FormValues>::Field>>;

/// Field values plus touched/error/submitting bookkeeping for one form.
pub struct Form<V: FormValues> {
    values: V,
    errors: FieldErrors<V::Field>,
    touched: BTreeSet<V::Field>,
    submitting: bool,
    submit_attempted: bool,
    validate: Validator<V>,
}

impl<V: FormValues + fmt::Debug> fmt::Debug for Form<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("touched", &self.touched)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

impl<V: FormValues> Form<V> {
    pub fn new<F>(initial: V, validate: F) -> Self
    where
        F: Fn(&V) -> FieldErrors<V::Field> + 'static,
    {
        Self {
            values: initial,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            submitting: false,
            submit_attempted: false,
            validate: Rc::new(validate),
        }
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn value(&self, field: V::Field) -> &str {
        self.values.field(field)
    }

    pub fn errors(&self) -> &FieldErrors<V::Field> {
        &self.errors
    }

    pub fn touched(&self) -> &BTreeSet<V::Field> {
        &self.touched
    }

    pub fn is_touched(&self, field: V::Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The error to display next to `field`: only once the user has edited
    /// it or tried to submit.
    pub fn visible_error(&self, field: V::Field) -> Option<&str> {
        if self.is_touched(field) || self.submit_attempted {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Commits the edit, marks the field touched and revalidates the whole
    /// committed value set.
    pub fn handle_change(&mut self, field: V::Field, value: impl Into<String>) {
        self.values.set_field(field, value.into());
        self.touched.insert(field);
        self.errors = (self.validate)(&self.values);
    }

    /// Validates the current values and, when they pass, hands out a copy for
    /// submission with the form marked as submitting. Pair with
    /// [`Form::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<V, ValidationError<V::Field>> {
        self.submitting = true;
        self.submit_attempted = true;
        self.errors = (self.validate)(&self.values);

        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            debug!(fields = self.errors.len(), "submit blocked by validation");
            self.submitting = false;
            Err(ValidationError(self.errors.clone()))
        }
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    /// Runs `on_submit` with the values when they validate. Whatever the
    /// callback returns (including its own errors) is passed back untouched.
    pub async fn handle_submit<F, Fut>(
        &mut self,
        on_submit: F,
    ) -> Result<Fut::Output, ValidationError<V::Field>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future,
    {
        let values = self.begin_submit()?;
        let output = on_submit(values).await;
        self.finish_submit();
        Ok(output)
    }

    /// Restores fresh state around `values`. Never called implicitly.
    pub fn reset(&mut self, values: V) {
        self.values = values;
        self.errors = FieldErrors::new();
        self.touched.clear();
        self.submitting = false;
        self.submit_attempted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldErrors, Form, FormValues};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Range {
        low: String,
        high: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum RangeField {
        Low,
        High,
    }

    impl FormValues for Range {
        type Field = RangeField;

        fn field(&self, field: RangeField) -> &str {
            match field {
                RangeField::Low => &self.low,
                RangeField::High => &self.high,
            }
        }

        fn set_field(&mut self, field: RangeField, value: String) {
            match field {
                RangeField::Low => self.low = value,
                RangeField::High => self.high = value,
            }
        }
    }

    fn validate_range(values: &Range) -> FieldErrors<RangeField> {
        let mut errors = FieldErrors::new();
        if values.low.is_empty() {
            errors.insert(RangeField::Low, "Low is required");
        }
        if values.high.is_empty() {
            errors.insert(RangeField::High, "High is required");
        }
        if let (Ok(low), Ok(high)) = (values.low.parse::<i32>(), values.high.parse::<i32>())
            && low > high
        {
            errors.insert(RangeField::High, "High must not be below low");
        }
        errors
    }

    #[test]
    fn change_marks_touched_and_validates_committed_values() {
        let mut form = Form::new(Range::default(), validate_range);

        form.handle_change(RangeField::Low, "5");
        assert!(form.is_touched(RangeField::Low));
        assert!(!form.is_touched(RangeField::High));
        assert_eq!(form.errors().get(RangeField::High), Some("High is required"));
        assert_eq!(form.visible_error(RangeField::High), None);

        form.handle_change(RangeField::High, "3");
        assert_eq!(
            form.visible_error(RangeField::High),
            Some("High must not be below low")
        );

        form.handle_change(RangeField::Low, "1");
        assert!(form.errors().is_empty());
        assert_eq!(form.value(RangeField::Low), "1");
    }

    #[tokio::test]
    async fn invalid_submit_skips_callback() {
        let mut form = Form::new(Range::default(), validate_range);
        let mut called = false;

        let result = form
            .handle_submit(|_| {
                called = true;
                async {}
            })
            .await;

        let err = result.expect_err("empty form must not submit");
        assert_eq!(err.0.len(), 2);
        assert!(!called);
        assert!(!form.is_submitting());
        assert_eq!(form.visible_error(RangeField::Low), Some("Low is required"));
    }

    #[tokio::test]
    async fn valid_submit_passes_values_and_clears_flag() {
        let mut form = Form::new(Range::default(), validate_range);
        form.handle_change(RangeField::Low, "1");
        form.handle_change(RangeField::High, "9");

        let outcome: Result<Result<(), String>, _> = form
            .handle_submit(|values| async move {
                assert_eq!(values.high, "9");
                Err("server said no".to_string())
            })
            .await;

        assert_eq!(outcome, Ok(Err("server said no".to_string())));
        assert!(!form.is_submitting());
        assert_eq!(form.values().low, "1");
    }

    #[test]
    fn begin_submit_holds_flag_until_finished() {
        let mut form = Form::new(
            Range {
                low: "1".into(),
                high: "2".into(),
            },
            validate_range,
        );
        let values = form.begin_submit().expect("valid");
        assert_eq!(values.low, "1");
        assert!(form.is_submitting());

        form.finish_submit();
        assert!(!form.is_submitting());

        form.reset(Range::default());
        assert!(form.touched().is_empty());
        assert_eq!(form.visible_error(RangeField::Low), None);
    }
}
