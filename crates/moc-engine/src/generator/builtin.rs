//! Builtin metatypes.
//!
//! Types listed here are referred to by their metatype id in the metadata
//! array; every other type goes through the string table.

/// A builtin metatype: the `QMetaType::Type` enumerator and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinType {
    pub enumerator: &'static str,
    pub id: u32,
}

const fn t(enumerator: &'static str, id: u32) -> BuiltinType {
    BuiltinType { enumerator, id }
}

/// Normalized type name to metatype, canonical names first, then aliases.
const BUILTIN_TYPES: &[(&str, BuiltinType)] = &[
    ("bool", t("Bool", 1)),
    ("int", t("Int", 2)),
    ("uint", t("UInt", 3)),
    ("qlonglong", t("LongLong", 4)),
    ("qulonglong", t("ULongLong", 5)),
    ("double", t("Double", 6)),
    ("QChar", t("QChar", 7)),
    ("QVariantMap", t("QVariantMap", 8)),
    ("QVariantList", t("QVariantList", 9)),
    ("QString", t("QString", 10)),
    ("QStringList", t("QStringList", 11)),
    ("QByteArray", t("QByteArray", 12)),
    ("QBitArray", t("QBitArray", 13)),
    ("QDate", t("QDate", 14)),
    ("QTime", t("QTime", 15)),
    ("QDateTime", t("QDateTime", 16)),
    ("QUrl", t("QUrl", 17)),
    ("QLocale", t("QLocale", 18)),
    ("QRect", t("QRect", 19)),
    ("QRectF", t("QRectF", 20)),
    ("QSize", t("QSize", 21)),
    ("QSizeF", t("QSizeF", 22)),
    ("QLine", t("QLine", 23)),
    ("QLineF", t("QLineF", 24)),
    ("QPoint", t("QPoint", 25)),
    ("QPointF", t("QPointF", 26)),
    ("QVariantHash", t("QVariantHash", 28)),
    ("QEasingCurve", t("QEasingCurve", 29)),
    ("QUuid", t("QUuid", 30)),
    ("void*", t("VoidStar", 31)),
    ("long", t("Long", 32)),
    ("short", t("Short", 33)),
    ("char", t("Char", 34)),
    ("ulong", t("ULong", 35)),
    ("ushort", t("UShort", 36)),
    ("uchar", t("UChar", 37)),
    ("float", t("Float", 38)),
    ("QObject*", t("QObjectStar", 39)),
    ("signed char", t("SChar", 40)),
    ("QVariant", t("QVariant", 41)),
    ("QModelIndex", t("QModelIndex", 42)),
    ("void", t("Void", 43)),
    ("QRegularExpression", t("QRegularExpression", 44)),
    ("QJsonValue", t("QJsonValue", 45)),
    ("QJsonObject", t("QJsonObject", 46)),
    ("QJsonArray", t("QJsonArray", 47)),
    ("QJsonDocument", t("QJsonDocument", 48)),
    ("QByteArrayList", t("QByteArrayList", 49)),
    ("QPersistentModelIndex", t("QPersistentModelIndex", 50)),
    ("std::nullptr_t", t("Nullptr", 51)),
    ("QCborSimpleType", t("QCborSimpleType", 52)),
    ("QCborValue", t("QCborValue", 53)),
    ("QCborArray", t("QCborArray", 54)),
    ("QCborMap", t("QCborMap", 55)),
    ("char16_t", t("Char16", 56)),
    ("char32_t", t("Char32", 57)),
    ("QVariantPair", t("QVariantPair", 58)),
    ("qfloat16", t("Float16", 63)),
    ("QFont", t("QFont", 0x1000)),
    ("QPixmap", t("QPixmap", 0x1001)),
    ("QBrush", t("QBrush", 0x1002)),
    ("QColor", t("QColor", 0x1003)),
    ("QPalette", t("QPalette", 0x1004)),
    ("QIcon", t("QIcon", 0x1005)),
    ("QImage", t("QImage", 0x1006)),
    ("QPolygon", t("QPolygon", 0x1007)),
    ("QRegion", t("QRegion", 0x1008)),
    ("QBitmap", t("QBitmap", 0x1009)),
    ("QCursor", t("QCursor", 0x100a)),
    ("QKeySequence", t("QKeySequence", 0x100b)),
    ("QPen", t("QPen", 0x100c)),
    ("QTextLength", t("QTextLength", 0x100d)),
    ("QTextFormat", t("QTextFormat", 0x100e)),
    ("QTransform", t("QTransform", 0x1010)),
    ("QMatrix4x4", t("QMatrix4x4", 0x1011)),
    ("QVector2D", t("QVector2D", 0x1012)),
    ("QVector3D", t("QVector3D", 0x1013)),
    ("QVector4D", t("QVector4D", 0x1014)),
    ("QQuaternion", t("QQuaternion", 0x1015)),
    ("QPolygonF", t("QPolygonF", 0x1016)),
    ("QColorSpace", t("QColorSpace", 0x1017)),
    ("QSizePolicy", t("QSizePolicy", 0x2000)),
    // aliases
    ("qreal", t("Double", 6)),
    ("qint8", t("SChar", 40)),
    ("quint8", t("UChar", 37)),
    ("qint16", t("Short", 33)),
    ("quint16", t("UShort", 36)),
    ("qint32", t("Int", 2)),
    ("quint32", t("UInt", 3)),
    ("qint64", t("LongLong", 4)),
    ("quint64", t("ULongLong", 5)),
    ("QList<QVariant>", t("QVariantList", 9)),
    ("QMap<QString,QVariant>", t("QVariantMap", 8)),
    ("QHash<QString,QVariant>", t("QVariantHash", 28)),
    ("QPair<QVariant,QVariant>", t("QVariantPair", 58)),
    ("QList<QByteArray>", t("QByteArrayList", 49)),
    ("QList<QString>", t("QStringList", 11)),
];

/// Look up a normalized type name.
pub fn builtin_type(name: &str) -> Option<BuiltinType> {
    BUILTIN_TYPES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ty)| *ty)
}

pub fn is_builtin(name: &str) -> bool {
    builtin_type(name).is_some()
}
